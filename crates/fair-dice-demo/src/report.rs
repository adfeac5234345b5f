//! Text reports: probability table, cycles and help.

use fair_dice_core::dice::{analyze, find_dominance_cycles, DominanceCycle};
use fair_dice_core::{Dice, ProbabilityMatrix};

pub const FAIR_PROTOCOL_EXPLANATION: &str = "\
FAIR RANDOM GENERATION:
I pick a secret number and a random 256-bit key, and show you HMAC-SHA3-256(key, number).
You then add a number of your own, modulo the range.
Afterwards I reveal my number and the key, so you can recompute the HMAC yourself.
The HMAC stops me from changing my number, and it tells you nothing about it,
so neither of us can steer the result.";

/// Percentage with one decimal, e.g. `55.6%`
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Percentage with two decimals, e.g. `55.56%`
pub fn format_probability_detailed(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub fn describe_cycle(cycle: &DominanceCycle) -> String {
    let [a, b, c] = cycle.indices;
    let [ab, bc, ca] = cycle.probabilities;
    format!(
        "Dice {} beats Dice {} ({}), Dice {} beats Dice {} ({}), Dice {} beats Dice {} ({})",
        a,
        b,
        format_probability_detailed(ab),
        b,
        c,
        format_probability_detailed(bc),
        c,
        a,
        format_probability_detailed(ca)
    )
}

/// Win chances of each row die (the user's) against each column die
pub fn probability_table(dice: &[Dice], matrix: &ProbabilityMatrix) -> String {
    let labels: Vec<String> = dice.iter().map(|d| format!("[{}]", d)).collect();
    let widest = labels.iter().map(String::len).max().unwrap_or(0);
    let header_width = widest.max(11);
    let cell_width = widest.max(8);

    let rule = |out: &mut String| {
        out.push('+');
        out.push_str(&"-".repeat(header_width + 2));
        for _ in &labels {
            out.push('+');
            out.push_str(&"-".repeat(cell_width + 2));
        }
        out.push_str("+\n");
    };

    let mut out = String::new();
    rule(&mut out);
    out.push_str(&format!("| {:^header_width$} ", "User dice v"));
    for label in &labels {
        out.push_str(&format!("| {:^cell_width$} ", label));
    }
    out.push_str("|\n");
    rule(&mut out);
    for (label, row) in labels.iter().zip(matrix.rows()) {
        out.push_str(&format!("| {:<header_width$} ", label));
        for p in row {
            out.push_str(&format!("| {:^cell_width$} ", format_probability(*p)));
        }
        out.push_str("|\n");
    }
    rule(&mut out);
    out
}

/// Everything shown when the user asks for help in the dice menu
pub fn help_text(dice: &[Dice], matrix: &ProbabilityMatrix) -> String {
    let mut out = String::new();
    out.push_str("GAME RULES:\n");
    out.push_str("Each player selects a different dice and rolls it; the higher roll wins.\n");
    out.push_str("Some dice may have surprising advantages over others!\n\n");
    out.push_str(FAIR_PROTOCOL_EXPLANATION);
    out.push_str("\n\nPROBABILITY TABLE (chance that the row dice beats the column dice):\n");
    out.push_str(&probability_table(dice, matrix));
    out.push_str("Diagonal entries are 50% by convention; ties count as a win for neither.\n\n");

    let analysis = analyze(matrix);
    out.push_str("DICE CONFIGURATIONS:\n");
    for (i, (d, rate)) in dice.iter().zip(&analysis.average_win_rates).enumerate() {
        out.push_str(&format!(
            "  Dice {}: [{}] (average win rate {})\n",
            i,
            d,
            format_probability(*rate)
        ));
    }

    let cycles = find_dominance_cycles(matrix);
    if cycles.is_empty() {
        out.push_str("\nNo non-transitive relationships in this set.\n");
    } else {
        out.push_str("\nNON-TRANSITIVE RELATIONSHIPS:\n");
        for cycle in &cycles {
            out.push_str(&format!("  {}\n", describe_cycle(cycle)));
        }
    }
    out
}
