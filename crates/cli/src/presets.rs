//! Preset expansion.
//!
//! A preset is shorthand for a group of flags. Expansion runs on the raw
//! argument list before clap sees it and only appends flags the user did not
//! already give, so an explicit `--template` always wins over a preset.

use tracing::debug;

/// Flags a preset expands to. A flag with a value is `(flag, Some(value))`.
fn preset_flags(name: &str) -> Option<&'static [(&'static str, Option<&'static str>)]> {
    match name.to_ascii_lowercase().as_str() {
        "react-tool" => Some(&[("--template", Some("react"))]),
        "react-three" => Some(&[("--template", Some("react")), ("--three", None)]),
        "vanilla-tool" => Some(&[("--template", Some("vanilla"))]),
        _ => None,
    }
}

/// Short aliases clap accepts for long flags a preset may add.
fn short_alias(flag: &str) -> Option<&'static str> {
    match flag {
        "--template" => Some("-t"),
        _ => None,
    }
}

/// The value of `--preset`/`-p`, in any of the forms clap accepts.
fn preset_value(args: &[String]) -> Option<&str> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--preset" || arg == "-p" {
            return iter.next().map(String::as_str);
        }
        if let Some(value) = arg.strip_prefix("--preset=") {
            return Some(value);
        }
        if let Some(value) = arg.strip_prefix("-p")
            && !value.is_empty()
        {
            return Some(value.trim_start_matches('='));
        }
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    let short = short_alias(flag);
    args.iter().skip(1).any(|arg| {
        arg == flag
            || arg.starts_with(&format!("{flag}="))
            || short.is_some_and(|s| arg == s || (arg.starts_with(s) && arg.len() > s.len()))
    })
}

/// Return `args` with the flags of the requested preset appended.
///
/// Unknown presets and argument lists without a preset come back unchanged.
/// Expanding an already expanded list is a no-op.
pub fn expand_presets(args: &[String]) -> Vec<String> {
    let mut expanded = args.to_vec();
    let Some(name) = preset_value(args) else {
        return expanded;
    };
    let Some(flags) = preset_flags(name) else {
        debug!(preset = name, "unknown preset, ignoring");
        return expanded;
    };

    for (flag, value) in flags {
        if has_flag(&expanded, flag) {
            continue;
        }
        expanded.push((*flag).to_string());
        if let Some(value) = value {
            expanded.push((*value).to_string());
        }
    }
    debug!(preset = name, args = ?&expanded[1..], "expanded preset");
    expanded
}
