//! Parsing of `aci` attribute values. The supported form is
//!
//! ```text
//! (targetattr = "a || b")(version 3.0; acl "name"; allow (read, search) userdn = "ldap:///anyone";)
//! ```
//!
//! One ACI value may carry several `allow` or `deny` clauses, each of which becomes one
//! [`AciRule`].

use std::collections::BTreeSet;

use crate::prelude::*;
use crate::utils::normalise_dn;

use super::profiles::{AciEffect, AciRights, AciRule, AciSubject, AciTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Semi,
    Comma,
    Eq,
    NotEq,
    Str(String),
    Word(String),
}

fn invalid(aci: &str, msg: &str) -> OperationError {
    admin_error!(?aci, "invalid aci - {}", msg);
    OperationError::InvalidAcpState(format!("{msg}: {aci}"))
}

fn tokenise(aci: &str) -> Result<Vec<Token>, OperationError> {
    let mut tokens = Vec::new();
    let mut chars = aci.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            ';' => tokens.push(Token::Semi),
            ',' => tokens.push(Token::Comma),
            '=' => tokens.push(Token::Eq),
            '!' => match chars.next() {
                Some('=') => tokens.push(Token::NotEq),
                _ => return Err(invalid(aci, "expected '=' after '!'")),
            },
            '"' => {
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(e) => s.push(e),
                            None => return Err(invalid(aci, "unterminated string")),
                        },
                        Some(ch) => s.push(ch),
                        None => return Err(invalid(aci, "unterminated string")),
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' => {
                let mut w = String::from(c);
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '.' || n == '-' {
                        w.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(w.to_lowercase()));
            }
            other => {
                return Err(invalid(aci, &format!("unexpected character '{other}'")));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    aci: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expect(&mut self, want: &Token, msg: &str) -> Result<(), OperationError> {
        match self.bump() {
            Some(t) if &t == want => Ok(()),
            _ => Err(invalid(self.aci, msg)),
        }
    }

    fn word(&mut self, msg: &str) -> Result<String, OperationError> {
        match self.bump() {
            Some(Token::Word(w)) => Ok(w),
            _ => Err(invalid(self.aci, msg)),
        }
    }

    fn string(&mut self, msg: &str) -> Result<String, OperationError> {
        match self.bump() {
            Some(Token::Str(s)) => Ok(s),
            _ => Err(invalid(self.aci, msg)),
        }
    }

    /// `=` or `!=`, returning true if negated.
    fn operator(&mut self) -> Result<bool, OperationError> {
        match self.bump() {
            Some(Token::Eq) => Ok(false),
            Some(Token::NotEq) => Ok(true),
            _ => Err(invalid(self.aci, "expected '=' or '!='")),
        }
    }

    fn target(&mut self) -> Result<AciTarget, OperationError> {
        let mut target = AciTarget::All;
        // Zero or more (keyword op "value") groups before the body.
        while self.peek() == Some(&Token::Open)
            && !matches!(self.tokens.get(self.pos + 1), Some(Token::Word(w)) if w == "version")
        {
            self.expect(&Token::Open, "expected '('")?;
            let keyword = self.word("expected a target keyword")?;
            if keyword != "targetattr" {
                return Err(invalid(self.aci, &format!("unsupported target '{keyword}'")));
            }
            let negate = self.operator()?;
            let value = self.string("expected a quoted attribute list")?;
            self.expect(&Token::Close, "expected ')' after target")?;

            let attrs: BTreeSet<AttrString> = value
                .split("||")
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(|a| AttrString::from(a.to_lowercase()))
                .collect();

            if attrs.is_empty() {
                return Err(invalid(self.aci, "empty targetattr"));
            }

            target = match (attrs.contains("*"), negate) {
                (true, false) => AciTarget::All,
                (true, true) => {
                    return Err(invalid(self.aci, "targetattr != \"*\" matches nothing"))
                }
                (false, false) => AciTarget::Attrs(attrs),
                (false, true) => AciTarget::AllExcept(attrs),
            };
        }
        Ok(target)
    }

    fn rights(&mut self) -> Result<AciRights, OperationError> {
        self.expect(&Token::Open, "expected '(' before rights")?;
        let mut rights = AciRights::empty();
        loop {
            let kw = self.word("expected a right")?;
            rights |= AciRights::from_keyword(&kw)
                .ok_or_else(|| invalid(self.aci, &format!("unknown right '{kw}'")))?;
            match self.bump() {
                Some(Token::Comma) => continue,
                Some(Token::Close) => break,
                _ => return Err(invalid(self.aci, "expected ',' or ')' in rights")),
            }
        }
        Ok(rights)
    }

    fn userdn_url(&self, url: &str) -> Result<AciSubject, OperationError> {
        let dn = url
            .trim()
            .strip_prefix("ldap:///")
            .ok_or_else(|| invalid(self.aci, "userdn must be an ldap:/// url"))?;
        Ok(match dn.to_lowercase().as_str() {
            "anyone" => AciSubject::Anyone,
            "all" => AciSubject::AllAuthenticated,
            "self" => AciSubject::SelfEntry,
            "anonymous" => AciSubject::Anonymous,
            _ => {
                let ndn = normalise_dn(dn).map_err(|_| invalid(self.aci, "invalid userdn"))?;
                AciSubject::Dn(ndn)
            }
        })
    }

    fn subject_term(&mut self) -> Result<AciSubject, OperationError> {
        let kw = self.word("expected a bind rule")?;
        if kw != "userdn" {
            return Err(invalid(self.aci, &format!("unsupported bind rule '{kw}'")));
        }
        let negate = self.operator()?;
        let value = self.string("expected a quoted userdn")?;
        let mut subjects = value
            .split("||")
            .map(|u| self.userdn_url(u))
            .collect::<Result<Vec<_>, _>>()?;

        let subject = if subjects.len() == 1 {
            subjects.remove(0)
        } else {
            AciSubject::AnyOf(subjects)
        };

        Ok(if negate {
            AciSubject::Not(Box::new(subject))
        } else {
            subject
        })
    }

    fn subject(&mut self) -> Result<AciSubject, OperationError> {
        let mut terms = vec![self.subject_term()?];
        while matches!(self.peek(), Some(Token::Word(w)) if w == "or") {
            self.pos += 1;
            terms.push(self.subject_term()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            AciSubject::AnyOf(terms)
        })
    }

    fn body(&mut self, target: &AciTarget) -> Result<Vec<AciRule>, OperationError> {
        self.expect(&Token::Open, "expected '(' before version")?;
        let kw = self.word("expected 'version'")?;
        if kw != "version" {
            return Err(invalid(self.aci, "expected 'version'"));
        }
        let version = self.word("expected a version number")?;
        if version != "3.0" {
            return Err(invalid(self.aci, "only aci version 3.0 is supported"));
        }
        self.expect(&Token::Semi, "expected ';' after version")?;

        let kw = self.word("expected 'acl'")?;
        if kw != "acl" {
            return Err(invalid(self.aci, "expected 'acl'"));
        }
        let name = self.string("expected a quoted acl name")?;
        self.expect(&Token::Semi, "expected ';' after acl name")?;

        let mut rules = Vec::new();
        while self.peek() != Some(&Token::Close) {
            let effect = match self.word("expected 'allow' or 'deny'")?.as_str() {
                "allow" => AciEffect::Allow,
                "deny" => AciEffect::Deny,
                _ => return Err(invalid(self.aci, "expected 'allow' or 'deny'")),
            };
            let rights = self.rights()?;
            let subject = self.subject()?;
            self.expect(&Token::Semi, "expected ';' after bind rule")?;

            rules.push(AciRule {
                name: name.clone(),
                effect,
                rights,
                target: target.clone(),
                subject,
            });
        }
        self.expect(&Token::Close, "expected ')' to close the aci")?;

        if rules.is_empty() {
            return Err(invalid(self.aci, "aci has no permissions"));
        }
        if self.pos != self.tokens.len() {
            return Err(invalid(self.aci, "trailing content after aci"));
        }
        Ok(rules)
    }
}

/// Parse one `aci` value into the rules it holds.
pub fn parse_aci(aci: &str) -> Result<Vec<AciRule>, OperationError> {
    let tokens = tokenise(aci)?;
    let mut parser = Parser {
        aci,
        tokens,
        pos: 0,
    };
    let target = parser.target()?;
    parser.body(&target)
}
