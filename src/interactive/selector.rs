use std::collections::BTreeSet;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::Result;
use crate::models::Region;

const CONTROLS: &str = "[1-9] toggle  [a] all  [n] none  [Enter/done] confirm  [q] quit";

/// What a line of input asks the selector to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStep {
    Continue,
    Confirm,
    Cancel,
    Invalid(String),
}

/// Line-driven checklist of regions.
pub struct RegionSelector {
    regions: Vec<Region>,
    selected: BTreeSet<usize>,
}

impl RegionSelector {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            selected: BTreeSet::new(),
        }
    }

    pub fn with_preselected(mut self, codes: &[String]) -> Self {
        for (index, region) in self.regions.iter().enumerate() {
            if codes.contains(&region.code) {
                self.selected.insert(index);
            }
        }
        self
    }

    /// Selected codes in list order.
    pub fn selected_codes(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|&index| self.regions[index].code.clone())
            .collect()
    }

    pub fn render(&self) -> String {
        let mut lines = vec!["Select Regions".to_string()];
        for (index, region) in self.regions.iter().enumerate() {
            let mark = if self.selected.contains(&index) { "x" } else { " " };
            lines.push(format!(
                "  [{}] {:>2}. {} ({})",
                mark,
                index + 1,
                region.name,
                region.code
            ));
        }
        lines.push(CONTROLS.to_string());
        lines.join("\n")
    }

    /// Apply one line of input.
    pub fn apply(&mut self, input: &str) -> SelectorStep {
        let command = input.trim().to_lowercase();
        match command.as_str() {
            "" | "done" => return SelectorStep::Confirm,
            "q" | "quit" => return SelectorStep::Cancel,
            "a" => {
                self.selected = (0..self.regions.len()).collect();
                return SelectorStep::Continue;
            }
            "n" => {
                self.selected.clear();
                return SelectorStep::Continue;
            }
            _ => {}
        }

        let mut toggles = Vec::new();
        for token in command.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            match token.parse::<usize>() {
                Ok(n) if (1..=self.regions.len()).contains(&n) => toggles.push(n - 1),
                _ => return SelectorStep::Invalid(token.to_string()),
            }
        }

        for index in toggles {
            if !self.selected.remove(&index) {
                self.selected.insert(index);
            }
        }
        SelectorStep::Continue
    }

    /// Drive the checklist until confirmed; cancel or end of input yields no selection.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<Vec<String>> {
        let mut lines = input.lines();

        loop {
            writeln!(output, "{}", self.render())?;
            write!(output, "> ")?;
            output.flush()?;

            let Some(line) = lines.next() else {
                writeln!(output)?;
                return Ok(Vec::new());
            };

            match self.apply(&line?) {
                SelectorStep::Continue => {}
                SelectorStep::Confirm => return Ok(self.selected_codes()),
                SelectorStep::Cancel => {
                    writeln!(output, "Selection cancelled.")?;
                    return Ok(Vec::new());
                }
                SelectorStep::Invalid(token) => {
                    writeln!(output, "Unknown choice: {}", token)?;
                }
            }
        }
    }

    /// Run against stdin/stdout; returns no selection when stdin is not a terminal.
    pub fn run_terminal(&mut self) -> Result<Vec<String>> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            println!("Interactive mode not available. Please use command line options.");
            return Ok(Vec::new());
        }
        self.run(stdin.lock(), io::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn selector() -> RegionSelector {
        RegionSelector::new(vec![
            Region::new("london", "London", 51.5, -0.12),
            Region::new("paris", "Paris", 48.85, 2.35),
            Region::new("oslo", "Oslo", 59.9, 10.7),
        ])
    }

    fn run_with(selector: &mut RegionSelector, script: &str) -> (Vec<String>, String) {
        let mut output = Vec::new();
        let codes = selector.run(Cursor::new(script), &mut output).unwrap();
        (codes, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_toggle_and_confirm() {
        let (codes, output) = run_with(&mut selector(), "1\n3\n\n");
        assert_eq!(codes, vec!["london".to_string(), "oslo".to_string()]);
        assert!(output.contains("[x]  1. London (london)"));
    }

    #[test]
    fn test_toggle_twice_deselects() {
        let (codes, _) = run_with(&mut selector(), "2 2, 1\ndone\n");
        assert_eq!(codes, vec!["london".to_string()]);
    }

    #[test]
    fn test_all_then_none() {
        let mut s = selector();
        assert_eq!(s.apply("a"), SelectorStep::Continue);
        assert_eq!(s.selected_codes().len(), 3);
        assert_eq!(s.apply("N"), SelectorStep::Continue);
        assert!(s.selected_codes().is_empty());
    }

    #[test]
    fn test_cancel_and_end_of_input_return_nothing() {
        let (codes, output) = run_with(&mut selector(), "a\nq\n");
        assert!(codes.is_empty());
        assert!(output.contains("Selection cancelled."));

        let (codes, _) = run_with(&mut selector(), "1\n");
        assert!(codes.is_empty());
    }

    #[test]
    fn test_preselection_and_invalid_input() {
        let mut s = selector().with_preselected(&["paris".to_string()]);
        let (codes, output) = run_with(&mut s, "9\nx\n\n");
        assert_eq!(codes, vec!["paris".to_string()]);
        assert!(output.contains("Unknown choice: 9"));
        assert!(output.contains("Unknown choice: x"));
    }
}
