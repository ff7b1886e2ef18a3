use crate::error;
use crate::lang::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Variable identifier
///
/// Canonical form of a variable name: uppercase with an explicit
/// trailing type sigil. A name without a sigil is a Single, so `AB`
/// and `AB!` are the same variable. The canonical text, sigil
/// included, is what determines the record layout in variable memory.

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Ident {
    String(Rc<str>),
    Single(Rc<str>),
    Double(Rc<str>),
    Integer(Rc<str>),
}

impl Ident {
    pub fn new(name: &str) -> Result<Ident> {
        let mut name = name.to_ascii_uppercase();
        let last = name.chars().last();
        let sigil = match last {
            Some(sigil @ '$') | Some(sigil @ '!') | Some(sigil @ '#') | Some(sigil @ '%') => {
                name.pop();
                sigil
            }
            _ => '!',
        };
        let mut chars = name.chars();
        match chars.next() {
            Some(ch) if ch.is_ascii_alphabetic() => {}
            _ => return Err(error!(SyntaxError)),
        }
        if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '.') {
            return Err(error!(SyntaxError));
        }
        if name.len() > 40 {
            return Err(error!(SyntaxError));
        }
        name.push(sigil);
        let name: Rc<str> = name.into();
        Ok(match sigil {
            '$' => Ident::String(name),
            '#' => Ident::Double(name),
            '%' => Ident::Integer(name),
            _ => Ident::Single(name),
        })
    }

    /// Canonical name, sigil included.
    pub fn as_str(&self) -> &str {
        use Ident::*;
        match self {
            String(s) | Single(s) | Double(s) | Integer(s) => s,
        }
    }

    pub fn sigil(&self) -> char {
        use Ident::*;
        match self {
            String(_) => '$',
            Single(_) => '!',
            Double(_) => '#',
            Integer(_) => '%',
        }
    }

    /// Length in bytes of the canonical name. Never zero.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
