//! Line matcher
//!
//! Classifies a single source line against a fixed, ordered battery of
//! four patterns. Matching is first-hit: once a pattern matches,
//! the remaining ones are not tried. A line matching none of them is
//! opaque and must be reproduced byte-identical by the caller.
//!
//! The input is deliberately *not* parsed as C. Every pattern is
//! anchored to an entire physical line; multi-line macro invocations
//! are out of scope.

use regex_lite::Regex;

/// Structured data extracted from a recognized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// `START_FUNC(...);`
    StartFunc { indent: String },
    /// `END_FUNC;`
    EndFunc { indent: String },
    /// `__context TYPE *NAME...;`
    ContextDecl {
        indent: String,
        /// Full declaration text, `__context ` stripped.
        decl_line: String,
        var_type: String,
        var_name: String,
    },
    /// `WAIT_EVT<N>(v1, v2, ...);`
    WaitEvt {
        indent: String,
        /// Full macro text (without the trailing `;`), for the marker comment.
        macro_text: String,
        num_evts: usize,
        vars: Vec<String>,
    },
}

/// Holds the compiled pattern battery; build once and reuse across lines.
pub struct LineMatcher {
    start_func: Regex,
    end_func: Regex,
    context_decl: Regex,
    wait_evt: Regex,
}

impl LineMatcher {
    pub fn new() -> Self {
        Self {
            start_func: Regex::new(r"^(?P<space>\s*)START_FUNC\([^)]+\)\s*;\s*$").unwrap(),
            end_func: Regex::new(r"^(?P<space>\s*)END_FUNC\s*;\s*$").unwrap(),
            context_decl: Regex::new(
                r"^(?P<space>\s*)__context\s+(?P<line>(?P<type>[a-zA-Z_$][0-9a-zA-Z_$]*)(?P<ptr>[\s*]+)(?P<varname>[a-zA-Z_$][0-9a-zA-Z_$]*)[^;]*;.*)$",
            )
            .unwrap(),
            wait_evt: Regex::new(
                r"^(?P<space>\s*)(?P<line>WAIT_EVT(?P<num>[0-9]+)\s*\((?P<vars>(?:[a-zA-Z_$][0-9a-zA-Z_$]*\s*(?:,\s*)?)+)\))\s*;",
            )
            .unwrap(),
        }
    }

    /// Try each pattern in order; the first that matches wins.
    pub fn match_line(&self, line: &str) -> Option<LineMatch> {
        if let Some(caps) = self.start_func.captures(line) {
            return Some(LineMatch::StartFunc { indent: caps["space"].to_string() });
        }
        if let Some(caps) = self.end_func.captures(line) {
            return Some(LineMatch::EndFunc { indent: caps["space"].to_string() });
        }
        if let Some(caps) = self.context_decl.captures(line) {
            let var_type = format!("{}{}", &caps["type"], caps["ptr"].replace(' ', "").replace('\t', ""));
            return Some(LineMatch::ContextDecl {
                indent: caps["space"].to_string(),
                decl_line: caps["line"].to_string(),
                var_type,
                var_name: caps["varname"].to_string(),
            });
        }
        if let Some(caps) = self.wait_evt.captures(line) {
            let num_evts: usize = caps["num"].parse().unwrap_or(0);
            let vars = caps["vars"]
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            return Some(LineMatch::WaitEvt {
                indent: caps["space"].to_string(),
                macro_text: caps["line"].to_string(),
                num_evts,
                vars,
            });
        }
        None
    }
}

impl Default for LineMatcher {
    fn default() -> Self {
        Self::new()
    }
}
