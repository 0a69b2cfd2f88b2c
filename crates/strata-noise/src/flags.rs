//! Comma separated flag strings: `"caves, nodungeons"`.
//!
//! Known names set their bit, a `no` prefix clears it, anything else is
//! ignored. Parsing starts from a caller supplied default.

/// Name/bit table for one flag set.
pub type FlagDesc = [(&'static str, u32)];

pub fn read_flag_string(s: &str, desc: &FlagDesc, default: u32) -> u32 {
    let mut set = 0u32;
    let mut clear = 0u32;
    for tok in s.split(',') {
        let tok = tok.trim().to_ascii_lowercase();
        if tok.is_empty() {
            continue;
        }
        if let Some(bit) = lookup(desc, &tok) {
            set |= bit;
        } else if let Some(bit) = tok.strip_prefix("no").and_then(|rest| lookup(desc, rest)) {
            clear |= bit;
        }
    }
    (default | set) & !clear
}

/// Inverse of [`read_flag_string`]: every known flag, prefixed with `no`
/// when cleared.
pub fn write_flag_string(value: u32, desc: &FlagDesc) -> String {
    desc.iter()
        .map(|(name, bit)| {
            if value & bit != 0 {
                (*name).to_string()
            } else {
                format!("no{name}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn lookup(desc: &FlagDesc, name: &str) -> Option<u32> {
    desc.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
}
