use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fixity {
    LeftInfix,
    RightInfix,
    Prefix,
}

/// Fixity and precedence of an operator definition. Higher precedence
/// binds tighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operator {
    pub fixity: Fixity,
    pub precedence: u8,
}

impl Operator {
    pub fn new(fixity: Fixity, precedence: u8) -> Self {
        Self { fixity, precedence }
    }

    pub fn left_infix(precedence: u8) -> Self {
        Self::new(Fixity::LeftInfix, precedence)
    }

    pub fn right_infix(precedence: u8) -> Self {
        Self::new(Fixity::RightInfix, precedence)
    }

    pub fn prefix(precedence: u8) -> Self {
        Self::new(Fixity::Prefix, precedence)
    }

    pub fn is_left_associative(&self) -> bool {
        self.fixity == Fixity::LeftInfix
    }

    pub fn is_prefix(&self) -> bool {
        self.fixity == Fixity::Prefix
    }

    pub fn is_infix(&self) -> bool {
        !self.is_prefix()
    }

    pub fn has_same_precedence_as(&self, other: &Operator) -> bool {
        self.precedence == other.precedence
    }

    pub fn has_less_precedence_than(&self, other: &Operator) -> bool {
        self.precedence < other.precedence
    }

    /// Should the shunting parser reduce `other` before pushing `self`?
    pub fn is_less_precedent_than(&self, other: &Operator) -> bool {
        (self.is_left_associative() && self.has_same_precedence_as(other))
            || self.has_less_precedence_than(other)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.fixity {
            Fixity::LeftInfix => "left infix",
            Fixity::RightInfix => "right infix",
            Fixity::Prefix => "prefix",
        };
        write!(f, "{} {}", keyword, self.precedence)
    }
}
