//! Car Purchase Walkthrough
//!
//! This demo drives a complete AHP session the way a UI would: declare the
//! criteria and the candidate cars, answer each prompted pairwise question on
//! the verbal scale, keep an eye on consistency, and print the final ranking.
//!
//! The "user" here is a small table of pre-baked answers; in a real
//! application each prompt would become a question on screen.

use ahp::prelude::*;

/// Pre-baked answers, one per prompted pair, in prompt order.
fn scripted_answer(prompt: &PairPrompt) -> Judgment {
    match (prompt.level, prompt.parent, prompt.first, prompt.second) {
        // Criteria: safety matters most, then running cost, then style.
        (0, 0, 0, 1) => Judgment::favoring_second(Intensity::Moderate), // cost vs safety
        (0, 0, 0, 2) => Judgment::favoring_first(Intensity::Strong),    // cost vs style
        (0, 0, 1, 2) => Judgment::favoring_first(Intensity::VeryStrong), // safety vs style

        // Under running cost the small hatchback wins big.
        (1, 0, 0, 1) => Judgment::favoring_first(Intensity::Strong),
        (1, 0, 0, 2) => Judgment::favoring_first(Intensity::Moderate),
        (1, 0, 1, 2) => Judgment::favoring_second(Intensity::Weak),

        // Under safety the SUV dominates.
        (1, 1, 0, 1) => Judgment::favoring_second(Intensity::Strong),
        (1, 1, 0, 2) => Judgment::favoring_second(Intensity::Weak),
        (1, 1, 1, 2) => Judgment::favoring_first(Intensity::Moderate),

        // Under style the coupe is the favorite.
        (1, 2, 0, 1) => Judgment::favoring_second(Intensity::Weak),
        (1, 2, 0, 2) => Judgment::favoring_second(Intensity::Strong),
        (1, 2, 1, 2) => Judgment::favoring_second(Intensity::Moderate),

        _ => Judgment::equal(),
    }
}

fn main() -> Result<(), AhpError> {
    println!("=== AHP Car Purchase Demo ===\n");

    let mut session = DecisionSession::new(2)?;
    for criterion in ["running cost", "safety", "style"] {
        session.add_factor(0, criterion)?;
    }
    for car in ["hatchback", "suv", "coupe"] {
        session.add_factor(1, car)?;
    }
    session.begin_elicitation()?;

    // Answer every prompted question.
    while let Some(prompt) = session.next_prompt() {
        let judgment = scripted_answer(&prompt);
        let context = match &prompt.parent_name {
            Some(parent) => format!("under \"{parent}\""),
            None => "between criteria".to_string(),
        };
        println!(
            "{} vs {} ({}): {} is {}",
            prompt.first_name,
            prompt.second_name,
            context,
            match judgment.side {
                Side::First => &prompt.first_name,
                Side::Second => &prompt.second_name,
            },
            judgment.intensity,
        );

        let consistent = session.apply_judgment(
            prompt.level,
            prompt.parent,
            prompt.first,
            prompt.second,
            judgment,
        )?;
        if !consistent {
            println!("  (this group is now inconsistent and would need re-elicitation)");
        }
    }

    let stats = session.coverage_stats();
    println!(
        "\nElicited {} of {} pairs across {} matrices, {} consistent",
        stats.judged_pairs, stats.total_pairs, stats.matrix_count, stats.consistent_matrices
    );

    let outcome = session.rank()?;
    println!("\nFinal ranking:");
    for (place, alternative) in outcome.ranking.iter().enumerate() {
        println!(
            "  {}. {:<10} {:.3}",
            place + 1,
            alternative.name,
            alternative.weight
        );
    }

    Ok(())
}
