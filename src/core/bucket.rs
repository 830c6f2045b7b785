use crate::domain::model::AgeBand;
use crate::utils::error::{EtlError, Result};

/// Maps a raw single-year age value into one of the 18 fixed bands.
///
/// Accepts plain integer ages ("0".."99") and the open top-coded interval
/// written with a trailing '+' ("100+"). Anything else is an error; the
/// bucketer never guesses.
pub fn bucket_age(raw: &str) -> Result<AgeBand> {
    let value = raw.trim();

    // A trailing '+' marks an open interval with no upper edge; wherever it
    // starts, the only band that can hold it is the open one.
    if let Some(digits) = value.strip_suffix('+') {
        let _: u32 = digits.parse().map_err(|_| EtlError::InvalidAge {
            value: raw.to_string(),
        })?;
        return Ok(AgeBand::Over85);
    }

    let age: u32 = value.parse().map_err(|_| EtlError::InvalidAge {
        value: raw.to_string(),
    })?;

    Ok(band_for(age))
}

/// Breakpoints at 5, 10, ..., 85: inclusive lower, exclusive upper.
pub fn band_for(age: u32) -> AgeBand {
    match age / 5 {
        0 => AgeBand::From0To4,
        1 => AgeBand::From5To9,
        2 => AgeBand::From10To14,
        3 => AgeBand::From15To19,
        4 => AgeBand::From20To24,
        5 => AgeBand::From25To29,
        6 => AgeBand::From30To34,
        7 => AgeBand::From35To39,
        8 => AgeBand::From40To44,
        9 => AgeBand::From45To49,
        10 => AgeBand::From50To54,
        11 => AgeBand::From55To59,
        12 => AgeBand::From60To64,
        13 => AgeBand::From65To69,
        14 => AgeBand::From70To74,
        15 => AgeBand::From75To79,
        16 => AgeBand::From80To84,
        _ => AgeBand::Over85,
    }
}
