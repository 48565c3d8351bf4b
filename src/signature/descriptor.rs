//! Runtime view of a signature.

use std::any::{type_name, TypeId};
use std::fmt;

use serde::Serialize;

use super::param::{Direction, Param, ParamKind};
use super::{ParamList, Signature};

/// One parameter of a [`CallDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDescriptor {
    pub kind: ParamKind,
    pub direction: Direction,
    pub type_name: &'static str,
}

impl ParamDescriptor {
    pub fn of<P: Param>() -> Self {
        Self {
            kind: P::KIND,
            direction: P::KIND.direction(),
            type_name: type_name::<P::Value>(),
        }
    }
}

/// Name, parameters and return type of a registered or called function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    /// `None` when the function returns `()`.
    pub returns: Option<&'static str>,
}

impl CallDescriptor {
    /// Describe `S` under its declared name.
    pub fn of<S: Signature>() -> Self {
        Self::named::<S>(S::NAME)
    }

    /// Describe `S` under a different wire name.
    pub fn named<S: Signature>(name: impl Into<String>) -> Self {
        let returns = if TypeId::of::<S::Output>() == TypeId::of::<()>() {
            None
        } else {
            Some(type_name::<S::Output>())
        };

        Self {
            name: name.into(),
            params: S::Params::describe(),
            returns,
        }
    }

    /// Number of parameters whose final value travels back.
    pub fn output_count(&self) -> usize {
        self.params.iter().filter(|p| p.kind.is_output()).count()
    }

    pub fn has_outputs(&self) -> bool {
        self.output_count() > 0
    }
}

impl fmt::Display for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", param.kind, param.type_name)?;
        }
        write!(f, ")")?;
        if let Some(returns) = self.returns {
            write!(f, " -> {}", returns)?;
        }
        Ok(())
    }
}
