//! Build script for flipclock-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates settings.toml at compile time
//! - Checks that the CYW43 radio firmware blobs are present

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys the firmware cannot start without
const REQUIRED_KEYS: [&str; 2] = ["ssid", "password"];

/// Keys the time-service profile additionally needs
const SERVICE_KEYS: [&str; 2] = ["aio_username", "aio_key"];

/// Largest accepted `tz_offset`, in seconds
const MAX_TZ_OFFSET: i64 = 14 * 3600;

/// Radio firmware expected next to the crate
const RADIO_BLOBS: [&str; 2] = ["cyw43-firmware/43439A0.bin", "cyw43-firmware/43439A0_clm.bin"];

fn main() {
    setup_linker();
    validate_settings();
    check_radio_blobs();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate settings.toml at compile time
fn validate_settings() {
    println!("cargo:rerun-if-changed=settings.toml");

    let settings_path = Path::new("settings.toml");

    if !settings_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: settings.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a settings.toml file with at least        ║\n\
            ║  `ssid` and `password`. Create one in the flipclock-firmware     ║\n\
            ║  directory.                                                      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(settings_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read settings.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let settings: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in settings.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    check_strings(&settings, &REQUIRED_KEYS, &mut errors);
    if env::var_os("CARGO_FEATURE_TIME_SERVICE").is_some() {
        check_strings(&settings, &SERVICE_KEYS, &mut errors);
    }
    check_optional(&settings, &mut errors);

    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings.toml                                    ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&lines.join("\n"))
        );
    }

    println!("cargo:warning=settings.toml validated successfully");
}

/// Every key in `keys` must be a non-empty string
fn check_strings(settings: &toml::Value, keys: &[&str], errors: &mut Vec<String>) {
    for key in keys {
        match settings.get(*key) {
            None => errors.push(format!("missing required key `{}`", key)),
            Some(toml::Value::String(s)) if s.is_empty() => {
                errors.push(format!("`{}` must not be empty", key))
            }
            Some(toml::Value::String(_)) => {}
            Some(_) => errors.push(format!("`{}` must be a string", key)),
        }
    }
}

/// Type checks for the optional keys
fn check_optional(settings: &toml::Value, errors: &mut Vec<String>) {
    match settings.get("LOCAL_TIME_FLAG") {
        None | Some(toml::Value::Boolean(_)) | Some(toml::Value::Integer(_)) => {}
        Some(toml::Value::String(s)) if s.trim().parse::<i64>().is_ok() => {}
        Some(_) => errors.push("`LOCAL_TIME_FLAG` must be a boolean or an integer".to_string()),
    }

    match settings.get("timezone") {
        None | Some(toml::Value::String(_)) => {}
        Some(_) => errors.push("`timezone` must be a string".to_string()),
    }

    let offset = match settings.get("tz_offset") {
        None => None,
        Some(toml::Value::Integer(n)) => Some(*n),
        Some(toml::Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(format!("`tz_offset` must be an integer, got \"{}\"", s));
                None
            }
        },
        Some(_) => {
            errors.push("`tz_offset` must be an integer".to_string());
            None
        }
    };
    if let Some(offset) = offset {
        if offset.abs() > MAX_TZ_OFFSET {
            errors.push(format!(
                "`tz_offset` {} is outside ±{} seconds",
                offset, MAX_TZ_OFFSET
            ));
        }
    }
}

/// The radio firmware is not redistributed with the source
fn check_radio_blobs() {
    for blob in RADIO_BLOBS {
        println!("cargo:rerun-if-changed={}", blob);
        if !Path::new(blob).exists() {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: CYW43 radio firmware not found                           ║\n\
                ║                                                                  ║\n\
                ║  Missing: {:<54} ║\n\
                ║                                                                  ║\n\
                ║  Copy 43439A0.bin and 43439A0_clm.bin from the embassy           ║\n\
                ║  repository (cyw43-firmware/) into flipclock-firmware/.          ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                blob
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
