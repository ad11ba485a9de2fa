use crate::manager_entsoe::errors::EntsoeError;

/// Bidding zones with day ahead prices on the ENTSO-E Transparency Platform
const AREAS: &[(&str, &str)] = &[
    ("AT", "10YAT-APG------L"),
    ("BE", "10YBE----------2"),
    ("BG", "10YCA-BULGARIA-R"),
    ("CH", "10YCH-SWISSGRIDZ"),
    ("CZ", "10YCZ-CEPS-----N"),
    ("DE", "10Y1001A1001A82H"),
    ("DE_LU", "10Y1001A1001A82H"),
    ("DK_1", "10YDK-1--------W"),
    ("DK_2", "10YDK-2--------M"),
    ("EE", "10Y1001A1001A39I"),
    ("ES", "10YES-REE------0"),
    ("FI", "10YFI-1--------U"),
    ("FR", "10YFR-RTE------C"),
    ("GR", "10YGR-HTSO-----Y"),
    ("HR", "10YHR-HEP------M"),
    ("HU", "10YHU-MAVIR----U"),
    ("IT_NORD", "10Y1001A1001A73I"),
    ("LT", "10YLT-1001A0008Q"),
    ("LV", "10YLV-1001A00074"),
    ("NL", "10YNL----------L"),
    ("NO_1", "10YNO-1--------2"),
    ("NO_2", "10YNO-2--------T"),
    ("NO_3", "10YNO-3--------J"),
    ("NO_4", "10YNO-4--------9"),
    ("NO_5", "10Y1001A1001A48H"),
    ("PL", "10YPL-AREA-----S"),
    ("PT", "10YPT-REN------W"),
    ("RO", "10YRO-TEL------P"),
    ("RS", "10YCS-SERBIATSOV"),
    ("SE_1", "10Y1001A1001A44P"),
    ("SE_2", "10Y1001A1001A45N"),
    ("SE_3", "10Y1001A1001A46L"),
    ("SE_4", "10Y1001A1001A47J"),
    ("SI", "10YSI-ELES-----O"),
    ("SK", "10YSK-SEPS-----K"),
];

/// Returns the EIC code of the bidding zone for a country code.
/// EIC codes (16 characters starting with `10Y`) are passed through as is.
///
/// # Arguments
///
/// * 'country' - country or bidding zone code, e.g. 'AT' or 'SE_4'
pub fn area_code(country: &str) -> Result<String, EntsoeError> {
    let key = country.trim().to_uppercase().replace('-', "_");

    if let Some((_, eic)) = AREAS.iter().find(|(code, _)| *code == key) {
        return Ok(eic.to_string());
    }

    if key.len() == 16 && key.starts_with("10Y") {
        return Ok(country.trim().to_string());
    }

    Err(EntsoeError::UnknownAreaError(country.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_countries() {
        assert_eq!(area_code("AT").unwrap(), "10YAT-APG------L");
        assert_eq!(area_code("se_4").unwrap(), "10Y1001A1001A47J");
        assert_eq!(area_code("DK-1").unwrap(), "10YDK-1--------W");
        assert_eq!(area_code("DE").unwrap(), area_code("DE_LU").unwrap());
    }

    #[test]
    fn eic_codes_pass_through() {
        assert_eq!(area_code("10YFI-1--------U").unwrap(), "10YFI-1--------U");
    }

    #[test]
    fn unknown_country() {
        assert!(matches!(area_code("XX"), Err(EntsoeError::UnknownAreaError(c)) if c == "XX"));
        assert!(matches!(area_code("10Y"), Err(EntsoeError::UnknownAreaError(_))));
    }
}
