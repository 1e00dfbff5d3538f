//! Property-based tests for argument filtering and configuration layering.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::ffi::OsString;
use std::path::Path;

use proptest::prelude::*;

use ocr_provision::cli::{Cli, split_args};
use ocr_provision::domain::config::{EnvOverrides, FlagOverrides, ProvisionFile, resolve};
use ocr_provision::domain::unit::{UnitSpec, render};

use clap::Parser;

fn argv(args: &[String]) -> Vec<OsString> {
    std::iter::once("ocr-provision".to_string())
        .chain(args.iter().cloned())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// split_args() property tests
// ============================================================================

proptest! {
    /// Unknown `--x-*` flags are always dropped and never reach clap.
    #[test]
    fn prop_unknown_flags_are_dropped(names in prop::collection::vec("[a-z]{3,10}", 1..5)) {
        let unknown: Vec<String> = names.iter().map(|n| format!("--x-{n}")).collect();
        let mut args = unknown.clone();
        args.push("--dry-run".to_string());

        let (known, ignored) = split_args(argv(&args));

        prop_assert_eq!(ignored, unknown);
        prop_assert_eq!(known.len(), 2);
        prop_assert!(Cli::try_parse_from(known).is_ok());
    }

    /// `--port N` and `--port=N` are equivalent once filtered.
    #[test]
    fn prop_port_forms_are_equivalent(port in 1u16..=65535, noise in "[a-z]{1,8}") {
        let spaced = vec![format!("--{noise}-junk"), "--port".to_string(), port.to_string()];
        let joined = vec![format!("--port={port}"), noise.clone()];

        let (a, _) = split_args(argv(&spaced));
        let (b, _) = split_args(argv(&joined));
        let a = Cli::try_parse_from(a).unwrap();
        let b = Cli::try_parse_from(b).unwrap();

        prop_assert_eq!(a.provision.port.clone(), Some(port.to_string()));
        prop_assert_eq!(a.provision.port, b.provision.port);
    }
}

// ============================================================================
// resolve() property tests
// ============================================================================

proptest! {
    /// A port given on the command line always wins over env and file.
    #[test]
    fn prop_flag_port_beats_env_and_file(
        flag in 1u16..=65535,
        env in 1u16..=65535,
        file in 1u16..=65535,
    ) {
        let req = resolve(
            &ProvisionFile { port: Some(file), ..Default::default() },
            &EnvOverrides { port: Some(env.to_string()), ..Default::default() },
            &FlagOverrides { port: Some(flag.to_string()), ..Default::default() },
            Path::new("/srv/checkout"),
        )
        .unwrap();
        prop_assert_eq!(req.service_port.get(), flag);
    }

    /// Out-of-range or non-numeric port text never produces a request.
    #[test]
    fn prop_invalid_port_text_is_rejected(text in "(0|[0-9]{6,8}|[a-z]{1,5}|-[0-9]{1,4})") {
        let result = resolve(
            &ProvisionFile::default(),
            &EnvOverrides::default(),
            &FlagOverrides { port: Some(text), ..Default::default() },
            Path::new("/srv/checkout"),
        );
        prop_assert!(result.is_err());
    }

    /// The resolved port is the one the rendered unit binds.
    #[test]
    fn prop_resolved_port_reaches_unit(port in 1u16..=65535) {
        let req = resolve(
            &ProvisionFile::default(),
            &EnvOverrides { port: Some(port.to_string()), ..Default::default() },
            &FlagOverrides::default(),
            Path::new("/srv/checkout"),
        )
        .unwrap();
        let unit = render(&UnitSpec::from_request(&req));
        let expected = format!("--port {port}\n");
        prop_assert!(unit.contains(&expected));
    }
}
