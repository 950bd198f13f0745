//! Conversion of raw adapter output into canonical draw records.

use crate::types::{
    BigSmall, DrawRecord, OddEven, PodiumError, PodiumResult, RawDraw, SumWindow, BIG_THRESHOLD,
    ENTRANT_COUNT,
};

/// Validate a raw draw and compute its derived fields.
pub fn normalize(raw: &RawDraw) -> PodiumResult<DrawRecord> {
    let period = raw.period.trim();
    if period.is_empty() || !period.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(period, "period must be a non-empty digit string"));
    }

    let entrants = parse_entrants(&raw.entrants).map_err(|reason| invalid(period, &reason))?;
    build_record(period, entrants, raw.window)
}

/// Build a record from already-parsed entrants, checking the entrant invariants.
pub fn build_record(
    period: &str,
    entrants: Vec<u8>,
    window: SumWindow,
) -> PodiumResult<DrawRecord> {
    check_entrants(period, &entrants)?;

    let sum: u32 = entrants[..window.width()].iter().map(|&e| e as u32).sum();

    Ok(DrawRecord {
        period: period.to_string(),
        entrants,
        sum,
        big_small: if sum >= BIG_THRESHOLD {
            BigSmall::Big
        } else {
            BigSmall::Small
        },
        odd_even: if sum % 2 == 1 {
            OddEven::Odd
        } else {
            OddEven::Even
        },
    })
}

/// Re-check a record that did not come through [`normalize`], such as one
/// read back from storage.
pub fn validate_record(record: &DrawRecord) -> PodiumResult<()> {
    let period = record.period.as_str();
    if period.is_empty() || !period.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(period, "period must be a non-empty digit string"));
    }
    check_entrants(period, &record.entrants)
}

fn check_entrants(period: &str, entrants: &[u8]) -> PodiumResult<()> {
    if entrants.len() != ENTRANT_COUNT {
        return Err(invalid(
            period,
            &format!("expected {ENTRANT_COUNT} entrants, got {}", entrants.len()),
        ));
    }

    let mut seen = [false; ENTRANT_COUNT + 1];
    for &e in entrants {
        if e == 0 || e as usize > ENTRANT_COUNT {
            return Err(invalid(period, &format!("entrant {e} out of range 1-10")));
        }
        if seen[e as usize] {
            return Err(invalid(period, &format!("entrant {e} repeated")));
        }
        seen[e as usize] = true;
    }
    Ok(())
}

/// Split an entrant list on commas and whitespace and parse each token.
pub fn parse_entrants(text: &str) -> Result<Vec<u8>, String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<u8>()
                .map_err(|_| format!("entrant token {t:?} is not a small number"))
        })
        .collect()
}

fn invalid(period: &str, reason: &str) -> PodiumError {
    PodiumError::InvalidDraw {
        period: period.to_string(),
        reason: reason.to_string(),
    }
}
