use url::Url;

use crate::error::{Result, ShdwError};
use crate::types::Pubkey;

const SI_UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const IEC_UNITS: [&str; 8] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Format a byte count for humans, e.g. `1073741824` → `"1.0 GiB"`.
///
/// `si` selects powers of 1000 instead of 1024; `dp` is the number of
/// decimal places. Values below one unit step are printed as plain bytes.
pub fn bytes_to_human(bytes: u64, si: bool, dp: usize) -> String {
    let thresh = if si { 1000.0 } else { 1024.0 };
    let units = if si { &SI_UNITS } else { &IEC_UNITS };

    let mut value = bytes as f64;
    if value < thresh {
        return format!("{bytes} B");
    }

    let r = 10f64.powi(dp as i32);
    let mut u = 0;
    value /= thresh;
    while (value * r).round() / r >= thresh && u < units.len() - 1 {
        value /= thresh;
        u += 1;
    }

    format!("{value:.dp$} {}", units[u])
}

/// Resolved location of an object: `<base>/<account>/<file_name>`.
pub fn file_url(base: &str, account: &Pubkey, file_name: &str) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| ShdwError::Validation(format!("not a base url: {base}")))?
        .pop_if_empty()
        .push(&account.to_string())
        .push(file_name);
    Ok(url.to_string())
}

/// Last path segment of a file URL, used as its display name.
pub fn file_name_from_url(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
}

/// Block explorer link for a transaction signature.
pub fn explorer_tx_url(signature: &str, cluster: &str) -> String {
    format!("https://explorer.solana.com/tx/{signature}?cluster={cluster}")
}
