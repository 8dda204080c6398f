//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use clap::Parser;

use crate::cli::commands::effective_config;
use crate::cli::{Cli, Commands};
use crate::config::DEFAULT_MAX_CALL_DEPTH;

#[test]
fn test_generate_command_exists() {
    // Test that the generate command can be parsed
    let cli = Cli::try_parse_from(["preroute", "generate", "--source", "app/src"]).unwrap();

    match cli.command {
        Commands::Generate { source, .. } => {
            assert_eq!(source.unwrap().to_string_lossy(), "app/src");
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_command_with_flags() {
    let cli = Cli::try_parse_from([
        "preroute",
        "generate",
        "--source",
        "app/src",
        "--output",
        "out",
        "--module",
        "routes",
        "--max-depth",
        "4",
        "--fail-on-warnings",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            source,
            output,
            module,
            max_depth,
            fail_on_warnings,
            config,
        } => {
            assert_eq!(source.unwrap().to_string_lossy(), "app/src");
            assert_eq!(output.unwrap().to_string_lossy(), "out");
            assert_eq!(module.as_deref(), Some("routes"));
            assert_eq!(max_depth, Some(4));
            assert!(fail_on_warnings);
            assert!(config.is_none());
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_check_command_parses() {
    let cli =
        Cli::try_parse_from(["preroute", "check", "--source", "app/src", "--fail-on-warnings"])
            .unwrap();

    match cli.command {
        Commands::Check {
            source,
            fail_on_warnings,
            ..
        } => {
            assert_eq!(source.unwrap().to_string_lossy(), "app/src");
            assert!(fail_on_warnings);
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_all_commands_parse() {
    // Verify all commands can be parsed
    let commands = vec![
        vec!["preroute", "generate"],
        vec!["preroute", "generate", "--source", "app/src", "--output", "out"],
        vec!["preroute", "check"],
        vec!["preroute", "check", "--max-depth", "2"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_effective_config_defaults() {
    let config = effective_config(&None, &None, &None, &None, false, &None).unwrap();
    assert_eq!(config.source, PathBuf::from("src"));
    assert_eq!(config.module_name, "generated");
    assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    assert!(!config.fail_on_warnings);
}

#[test]
fn test_effective_config_flags_override_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("preroute.toml"),
        "module_name = \"api\"\nmax_call_depth = 3\n",
    )
    .unwrap();
    let source = Some(dir.path().join("src"));

    let config = effective_config(
        &source,
        &None,
        &Some("overridden".to_string()),
        &None,
        false,
        &None,
    )
    .unwrap();

    // File value survives where no flag was given, flag wins where one was.
    assert_eq!(config.max_call_depth, 3);
    assert_eq!(config.module_name, "overridden");
    assert_eq!(config.source, dir.path().join("src"));
}

#[test]
fn test_effective_config_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = Some(dir.path().join("nope.toml"));
    let result = effective_config(&None, &None, &None, &None, false, &missing);
    assert!(result.is_err());
}
