//! Field normalization: years, sessions and paper tokens.

use crate::error::ClassifyError;
use crate::patterns::PatternId;
use crate::vocab::{
    Vocabulary, EDEXCEL, EXAMINER_REPORT, FEB_MARCH, JANUARY, MARK_SCHEME, MAY_JUNE, OCT_NOV,
};

/// Parse a year token. Two-digit years are taken as 20xx.
pub fn parse_year(year: Option<&str>) -> Result<i32, ClassifyError> {
    let token = year.unwrap_or_default().trim();

    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClassifyError::InvalidYear(token.to_string()));
    }

    let expanded = if token.len() == 2 {
        format!("20{}", token)
    } else {
        token.to_string()
    };

    expanded
        .parse()
        .map_err(|_| ClassifyError::InvalidYear(token.to_string()))
}

/// Two-digit form of a year, as used in output filenames
pub fn short_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

/// Resolve session and year, applying the Edexcel publication shift.
///
/// Edexcel short-form mark schemes and examiner reports are dated by when
/// they were released, which trails the sitting they cover: a January
/// release belongs to the previous October/November, a Feb-March release to
/// January and an Oct-Nov release to May-June. This must run exactly once
/// per classification.
pub fn parse_date(
    months: &Vocabulary,
    month: Option<&str>,
    year: Option<&str>,
    type_str: Option<&str>,
    board: &str,
    pattern: PatternId,
) -> Result<(Option<&'static str>, i32), ClassifyError> {
    let mut year = parse_year(year)?;
    let mut session = month.and_then(|m| months.to_canonical(m));

    let shifted_type = matches!(type_str, Some(MARK_SCHEME) | Some(EXAMINER_REPORT));
    if board == EDEXCEL && pattern == PatternId::EdexcelShort && shifted_type {
        session = match session {
            Some(JANUARY) => {
                year -= 1;
                Some(OCT_NOV)
            }
            Some(FEB_MARCH) => Some(JANUARY),
            Some(OCT_NOV) => Some(MAY_JUNE),
            other => other,
        };
    }

    Ok((session, year))
}

/// Split a combined paper token into `(number, variant)`.
///
/// Rules are tried in order and the first that applies wins.
pub fn split_paper(paper: Option<&str>) -> (Option<String>, Option<String>) {
    let paper = match paper {
        Some(p) if !p.is_empty() => p,
        _ => return (None, None),
    };

    let chars: Vec<char> = paper.chars().collect();
    let zero = Some("0".to_string());

    if chars[0] == '0' && chars.len() > 1 {
        (Some(chars[1].to_string()), zero)
    } else if chars.len() == 1 {
        (Some(paper.to_string()), zero)
    } else if matches!(chars[chars.len() - 1], 'r' | 'R') {
        let number: String = chars[..chars.len() - 1].iter().collect();
        (Some(number), Some("R".to_string()))
    } else if chars.len() == 2 && chars.iter().all(|c| c.is_ascii_digit()) {
        (Some(chars[0].to_string()), Some(chars[1].to_string()))
    } else {
        (Some(paper.to_string()), zero)
    }
}
