/// Fixed observations printed at the end of every run.
pub const INSIGHTS: [&str; 3] = [
    "India experienced a large spike in cases around May 2021.",
    "Kenya had a slower but steady vaccination progress.",
    "The US had the earliest and most aggressive vaccination rollout among the three.",
];

/// The insight block exactly as printed.
pub fn render() -> String {
    let mut out = String::from("\nSample Insights:\n");
    for (i, line) in INSIGHTS.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, line));
    }
    out
}

pub fn print() {
    print!("{}", render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_under_heading() {
        let text = render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Sample Insights:");
        assert_eq!(
            lines[2],
            "1. India experienced a large spike in cases around May 2021."
        );
        assert!(lines[4].starts_with("3. The US"));
        assert_eq!(lines.len(), 5);
    }
}
