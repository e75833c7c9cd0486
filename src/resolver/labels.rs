use std::collections::BTreeMap;

use crate::codegen::{Line, ResolvedInstruction};
use crate::resolver::ResolveError;

/// Resolved code: executable instructions only, targets as 1-based line
/// numbers, plus the label map used to produce them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    pub instructions: Vec<ResolvedInstruction>,
    pub labels: BTreeMap<String, usize>,
}

/// Map every label to the 1-based index of the next executable line.
/// A label with nothing after it maps one past the last line.
/// # Errors
/// If a label is declared twice
pub fn collect_labels(lines: &[Line]) -> Result<BTreeMap<String, usize>, ResolveError> {
    let executable = lines.iter().filter(|line| !line.is_label()).count();
    let mut labels = BTreeMap::new();
    let mut next = executable + 1;

    for line in lines.iter().rev() {
        match line {
            Line::Instr(_) => next -= 1,
            Line::Label(name) => {
                if labels.insert(name.clone(), next).is_some() {
                    return Err(ResolveError::DuplicateLabel(name.clone()));
                }
            }
        }
    }

    Ok(labels)
}

/// Replace every symbolic jump target with its line number and drop the
/// label declarations
/// # Errors
/// On a duplicate label or a jump to a label that is never declared
#[tracing::instrument(skip_all)]
pub fn resolve(lines: &[Line]) -> Result<Resolution, ResolveError> {
    let labels = collect_labels(lines)?;

    let instructions = lines
        .iter()
        .filter_map(|line| match line {
            Line::Instr(instr) => Some(instr),
            Line::Label(_) => None,
        })
        .map(|instr| {
            instr.clone().try_map_target(|target| {
                labels
                    .get(&target)
                    .copied()
                    .ok_or(ResolveError::UndefinedLabel(target))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        labels = labels.len(),
        instructions = instructions.len(),
        "resolved labels"
    );
    Ok(Resolution {
        instructions,
        labels,
    })
}

/// Parse a textual symbolic listing, one label or instruction per line.
/// Blank lines are skipped.
/// # Errors
/// On the first line that is neither a label nor an instruction
pub fn parse_listing(text: &str) -> Result<Vec<Line>, ResolveError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.parse::<Line>()
                .map_err(|e| ResolveError::MalformedLine(index + 1, e))
        })
        .collect()
}

/// Resolve a textual symbolic listing
/// # Errors
/// As `parse_listing` and `resolve`
pub fn resolve_text(text: &str) -> Result<Resolution, ResolveError> {
    resolve(&parse_listing(text)?)
}
