use anyhow::{bail, Result};

/// Host-provided credential picker consulted before credentialed models.
pub trait CredentialSelector: Send {
    fn has_selected_credential(&self) -> Result<bool>;
    fn open_selection(&self) -> Result<()>;
}

/// Reports whether a key was configured; there is no picker to open.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredKeySelector {
    has_key: bool,
}

impl ConfiguredKeySelector {
    pub fn new(has_key: bool) -> Self {
        Self { has_key }
    }
}

impl CredentialSelector for ConfiguredKeySelector {
    fn has_selected_credential(&self) -> Result<bool> {
        Ok(self.has_key)
    }

    fn open_selection(&self) -> Result<()> {
        bail!("no credential picker in this host; set GEMINI_API_KEY instead")
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfiguredKeySelector, CredentialSelector};

    #[test]
    fn configured_selector_reports_key_presence() -> anyhow::Result<()> {
        assert!(ConfiguredKeySelector::new(true).has_selected_credential()?);
        assert!(!ConfiguredKeySelector::new(false).has_selected_credential()?);
        assert!(ConfiguredKeySelector::new(false).open_selection().is_err());
        Ok(())
    }
}
