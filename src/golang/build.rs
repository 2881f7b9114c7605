//! Build constraints: which `.go` files in a directory belong to the package
//! for the configured GOOS/GOARCH.

use std::path::Path;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mips64", "mips64le", "mipsle", "ppc64",
    "ppc64le", "riscv64", "s390x", "wasm", "sparc64",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Target platform tags
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    fn matches_os(&self, os: &str) -> bool {
        os == self.goos
            || (os == "linux" && self.goos == "android")
            || (os == "solaris" && self.goos == "illumos")
            || (os == "darwin" && self.goos == "ios")
    }

    fn tag_satisfied(&self, tag: &str) -> bool {
        if self.matches_os(tag) || tag == self.goarch || tag == "gc" {
            return true;
        }
        if tag == "unix" {
            return UNIX_OS.contains(&self.goos.as_str());
        }
        tag.starts_with("go1.")
    }

    /// Whether a file with this name is part of the package (ignoring its
    /// contents).
    pub fn matches_file_name(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !name.ends_with(".go") || name.ends_with("_test.go") {
            return false;
        }
        if name.starts_with('.') || name.starts_with('_') {
            return false;
        }
        let stem = &name[..name.len() - 3];
        self.matches_os_arch_suffix(stem)
    }

    fn matches_os_arch_suffix(&self, stem: &str) -> bool {
        // The first element never acts as a constraint: linux.go is unconstrained.
        let parts: Vec<&str> = stem.split('_').skip(1).collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_os(parts[n - 2]) && parts[n - 1] == self.goarch;
        }
        if n >= 1 {
            let last = parts[n - 1];
            if KNOWN_OS.contains(&last) {
                return self.matches_os(last);
            }
            if KNOWN_ARCH.contains(&last) {
                return last == self.goarch;
            }
        }
        true
    }

    /// Evaluate the `//go:build` line (or legacy `// +build` lines) in the
    /// file header. Files without constraints always match.
    pub fn matches_source(&self, source: &str) -> bool {
        let mut legacy = Vec::new();
        let mut in_block = false;
        for line in source.lines() {
            let mut trimmed = line.trim();
            if in_block {
                let Some(end) = trimmed.find("*/") else {
                    continue;
                };
                trimmed = trimmed[end + 2..].trim_start();
                in_block = false;
            }
            while let Some(body) = trimmed.strip_prefix("/*") {
                match body.find("*/") {
                    Some(end) => trimmed = body[end + 2..].trim_start(),
                    None => {
                        in_block = true;
                        trimmed = "";
                    }
                }
            }
            if trimmed.is_empty() {
                continue;
            }
            if let Some(expr) = trimmed.strip_prefix("//go:build") {
                return match parse_expr(expr) {
                    Some(expr) => expr.eval(&|tag| self.tag_satisfied(tag)),
                    None => true,
                };
            }
            if let Some(tags) = trimmed.strip_prefix("// +build") {
                legacy.push(tags.to_string());
                continue;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            break;
        }
        legacy
            .iter()
            .all(|line| self.matches_legacy_line(line))
    }

    // Space-separated options are ORed, comma-separated terms ANDed.
    fn matches_legacy_line(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !self.tag_satisfied(tag),
                None => self.tag_satisfied(term),
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, satisfied: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(tag) => satisfied(tag),
            Self::Not(inner) => !inner.eval(satisfied),
            Self::And(a, b) => a.eval(satisfied) && b.eval(satisfied),
            Self::Or(a, b) => a.eval(satisfied) || b.eval(satisfied),
        }
    }
}

fn tokenize(expr: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' | ')' | '!' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return None;
                }
                tokens.push(format!("{c}{c}"));
            }
            _ if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        tag.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(tag);
            }
            _ => return None,
        }
    }
    Some(tokens)
}

fn parse_expr(expr: &str) -> Option<Expr> {
    let tokens = tokenize(expr)?;
    let mut pos = 0;
    let parsed = parse_or(&tokens, &mut pos)?;
    (pos == tokens.len()).then_some(parsed)
}

fn parse_or(tokens: &[String], pos: &mut usize) -> Option<Expr> {
    let mut left = parse_and(tokens, pos)?;
    while tokens.get(*pos).map(String::as_str) == Some("||") {
        *pos += 1;
        let right = parse_and(tokens, pos)?;
        left = Expr::Or(Box::new(left), Box::new(right));
    }
    Some(left)
}

fn parse_and(tokens: &[String], pos: &mut usize) -> Option<Expr> {
    let mut left = parse_unary(tokens, pos)?;
    while tokens.get(*pos).map(String::as_str) == Some("&&") {
        *pos += 1;
        let right = parse_unary(tokens, pos)?;
        left = Expr::And(Box::new(left), Box::new(right));
    }
    Some(left)
}

fn parse_unary(tokens: &[String], pos: &mut usize) -> Option<Expr> {
    let token = tokens.get(*pos)?;
    *pos += 1;
    match token.as_str() {
        "!" => Some(Expr::Not(Box::new(parse_unary(tokens, pos)?))),
        "(" => {
            let inner = parse_or(tokens, pos)?;
            if tokens.get(*pos).map(String::as_str) != Some(")") {
                return None;
            }
            *pos += 1;
            Some(inner)
        }
        ")" | "&&" | "||" => None,
        tag => Some(Expr::Tag(tag.to_string())),
    }
}
