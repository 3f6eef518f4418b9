use crate::error::RuntimeErrorKind;
use crate::value::{Number, Value};

/// Evaluated call arguments
pub(crate) struct Args {
    function: String,
    pub positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
}

impl Args {
    pub fn new(
        function: impl Into<String>,
        positional: Vec<Value>,
        keywords: Vec<(String, Value)>,
    ) -> Self {
        Self {
            function: function.into(),
            positional,
            keywords,
        }
    }

    pub fn bad(&self, reason: impl Into<String>) -> RuntimeErrorKind {
        RuntimeErrorKind::BadArguments {
            function: self.function.clone(),
            reason: reason.into(),
        }
    }

    /// Remove and return a keyword argument
    pub fn keyword(&mut self, name: &str) -> Option<Value> {
        let position = self.keywords.iter().position(|(key, _)| key == name)?;
        Some(self.keywords.remove(position).1)
    }

    /// Check the positional count; any keyword not yet taken is rejected
    pub fn expect(&self, min: usize, max: usize) -> Result<(), RuntimeErrorKind> {
        if let Some((key, _)) = self.keywords.first() {
            return Err(self.bad(format!("unexpected keyword argument '{}'", key)));
        }
        let count = self.positional.len();
        if count < min || count > max {
            let expected = if min == max {
                format!("{}", min)
            } else if max == usize::MAX {
                format!("at least {}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(self.bad(format!(
                "expected {} argument(s), got {}",
                expected, count
            )));
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn int(&self, index: usize) -> Result<i64, RuntimeErrorKind> {
        match self.get(index).and_then(Value::as_number) {
            Some(Number::Int(n)) => Ok(n),
            _ => Err(self.bad(format!("argument {} must be an integer", index + 1))),
        }
    }

    pub fn str(&self, index: usize) -> Result<&str, RuntimeErrorKind> {
        self.get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| self.bad(format!("argument {} must be a string", index + 1)))
    }

    /// Consume the keywords as name/value pairs
    pub fn into_keywords(self) -> Vec<(String, Value)> {
        self.keywords
    }
}
