//! macOS defaults resource - typed preference pairs

use anyhow::Result;
use declarative::{ApplyContext, Resource, ResourceKind, TypedValue};

/// A key in a `defaults` domain with the value and type it must hold
#[derive(Debug, Clone)]
pub struct MacOSDefault {
    /// Domain (e.g., "com.apple.menuextra.battery")
    pub domain: String,
    /// Key (e.g., "ShowPercent")
    pub key: String,
    pub value: TypedValue,
}

impl MacOSDefault {
    pub fn new(domain: &str, key: &str, value: impl Into<TypedValue>) -> Self {
        Self {
            domain: domain.to_string(),
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn default_name(&self) -> String {
        format!("{}:{}", self.domain, self.key)
    }
}

impl Resource for MacOSDefault {
    fn kind(&self) -> ResourceKind {
        ResourceKind::KeyValueSetting
    }

    fn description(&self) -> String {
        format!(
            "Set {} {} to {} ({})",
            self.domain,
            self.key,
            self.value,
            self.value.type_name()
        )
    }

    /// Satisfied only when the stored value has the same type and value
    fn is_satisfied(&self, ctx: &ApplyContext) -> Result<bool> {
        match ctx.prefs.get(&self.domain, &self.key)? {
            Some(current) if current.same_as(&self.value) => Ok(true),
            Some(current) => {
                log::debug!(
                    "{} {}: stored {} {current}, want {} {}",
                    self.domain,
                    self.key,
                    current.type_name(),
                    self.value.type_name(),
                    self.value
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        ctx.prefs.set(&self.domain, &self.key, &self.value)
    }
}
