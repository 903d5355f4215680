// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tokenizing and flag parsing for the interactive shell
//!
//! Every command argument travels under a flag: short (`-n`) or long
//! (`--name`). Square brackets group whitespace into a single token, so
//! `search -n [st anselm]` passes one argument to `-n`.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("command unrecognized")]
    UnknownCommand,
    #[error("flag unrecognized")]
    UnknownFlag,
    #[error("flag repeated")]
    RepeatedFlag,
    #[error("unclosed group")]
    UnclosedGroup,
    #[error("missing required flag -{0}")]
    MissingFlag(&'static str),
    #[error("too many arguments for flag -{0}")]
    TooManyArgs(&'static str),
    #[error("too few arguments for flag -{0}")]
    TooFewArgs(&'static str),
}

/// A flag a command accepts
#[derive(Clone, Copy)]
pub struct FlagSpec {
    pub name: &'static str,
    pub long: &'static str,
    pub help: &'static str,
    pub required: bool,
    pub min_args: usize,
    /// `None` means unbounded
    pub max_args: Option<usize>,
}

impl FlagSpec {
    pub const fn one(
        name: &'static str,
        long: &'static str,
        help: &'static str,
        required: bool,
    ) -> Self {
        Self {
            name,
            long,
            help,
            required,
            min_args: 1,
            max_args: Some(1),
        }
    }

    pub const fn many(
        name: &'static str,
        long: &'static str,
        help: &'static str,
        required: bool,
    ) -> Self {
        Self {
            name,
            long,
            help,
            required,
            min_args: 1,
            max_args: None,
        }
    }
}

/// A shell command and the flags it accepts
pub struct CommandSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub flags: &'static [FlagSpec],
}

/// Flag values extracted from one input line
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Parsed {
    values: HashMap<&'static str, Vec<String>>,
}

impl Parsed {
    /// The single argument of a one-arg flag, if present
    pub fn one(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// All arguments of a flag; empty when the flag was absent
    pub fn many(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Split an input line into tokens, honoring `[...]` grouping
pub fn tokenize(input: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_group = false;

    for ch in input.chars() {
        match ch {
            '[' if !in_group => {
                in_group = true;
                current.clear();
            }
            ']' if in_group => {
                in_group = false;
                tokens.push(std::mem::take(&mut current));
            }
            c if c.is_whitespace() && !in_group => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_group {
        return Err(ParseError::UnclosedGroup);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Match flag tokens against a command's spec and validate arity
pub fn parse_flags(spec: &CommandSpec, tokens: &[String]) -> Result<Parsed, ParseError> {
    let mut parsed = Parsed::default();
    let mut current: Option<&'static str> = None;

    for token in tokens {
        let flag = if let Some(long) = token.strip_prefix("--") {
            spec.flags.iter().find(|f| f.long == long)
        } else if let Some(short) = token.strip_prefix('-') {
            // A lone "-" or a negative number is an argument, not a flag
            spec.flags.iter().find(|f| f.name == short)
        } else {
            None
        };

        match flag {
            Some(flag) => {
                if parsed.values.contains_key(flag.name) {
                    return Err(ParseError::RepeatedFlag);
                }
                parsed.values.insert(flag.name, Vec::new());
                current = Some(flag.name);
            }
            None => {
                let Some(name) = current else {
                    return Err(ParseError::UnknownFlag);
                };
                if let Some(values) = parsed.values.get_mut(name) {
                    values.push(token.clone());
                }
            }
        }
    }

    for flag in spec.flags {
        match parsed.values.get(flag.name) {
            None => {
                if flag.required {
                    return Err(ParseError::MissingFlag(flag.name));
                }
            }
            Some(values) => {
                if let Some(max) = flag.max_args {
                    if values.len() > max {
                        return Err(ParseError::TooManyArgs(flag.name));
                    }
                }
                if values.len() < flag.min_args {
                    return Err(ParseError::TooFewArgs(flag.name));
                }
            }
        }
    }

    Ok(parsed)
}
