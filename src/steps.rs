use crate::content::{Simulation, SimulationStep};

/// One screen of a simulation's fixed sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub order: u32,
    pub title: String,
    /// markdown
    pub description: String,
    pub hints: Vec<String>,
}

impl StepDefinition {
    fn builtin(order: u32, title: &str, description: &str, hints: &[&str]) -> Self {
        Self {
            order,
            title: title.to_string(),
            description: description.to_string(),
            hints: hints.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn has_hints(&self) -> bool {
        !self.hints.is_empty()
    }
}

impl From<SimulationStep> for StepDefinition {
    fn from(step: SimulationStep) -> Self {
        Self {
            order: step.step_order,
            title: step.title,
            description: step.description,
            hints: step.hints,
        }
    }
}

/// Simulation types with an interactive engine, keyed by `component_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SimulationKind {
    #[strum(serialize = "wallet-creation")]
    WalletCreation,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 1] = [SimulationKind::WalletCreation];

    pub fn component_type(&self) -> &'static str {
        match self {
            SimulationKind::WalletCreation => "wallet-creation",
        }
    }

    pub fn from_component_type(component_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.component_type() == component_type)
    }

    /// Slug lookups predate `component_type`; only the wallet walkthrough has one
    pub fn from_legacy_slug(slug: &str) -> Option<Self> {
        match slug {
            "create-your-first-wallet" => Some(SimulationKind::WalletCreation),
            _ => None,
        }
    }

    /// Resolve the engine for a stored simulation row, once, before the run starts
    pub fn resolve(simulation: &Simulation) -> Option<Self> {
        Self::from_component_type(&simulation.component_type)
            .or_else(|| Self::from_legacy_slug(&simulation.slug))
    }

    pub fn step_metadata(&self) -> Vec<StepDefinition> {
        match self {
            SimulationKind::WalletCreation => wallet_creation_steps(),
        }
    }
}

/// Stored steps win; otherwise the built-in table for a registered kind
pub fn steps_for(simulation: &Simulation, stored: Vec<SimulationStep>) -> Vec<StepDefinition> {
    if !stored.is_empty() {
        let mut steps: Vec<StepDefinition> = stored.into_iter().map(Into::into).collect();
        steps.sort_by_key(|s| s.order);
        return steps;
    }
    SimulationKind::resolve(simulation)
        .map(|k| k.step_metadata())
        .unwrap_or_default()
}

pub fn wallet_creation_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::builtin(
            0,
            "Welcome",
            "You are about to create a **practice** wallet. Everything generated here is fake, \
             but the steps match what a real wallet app asks of you.",
            &["Take your time, nothing here touches real funds."],
        ),
        StepDefinition::builtin(
            1,
            "Generate Your Wallet",
            "The wallet creates a **private key**, derives a **public key** from it, and turns \
             that into the **address** you share with others.",
            &[
                "Real wallets use a secure random source for this, never a website you don't trust.",
            ],
        ),
        StepDefinition::builtin(
            2,
            "Back Up Your Recovery Phrase",
            "Your 12-word phrase can restore this wallet on any device. Write the words down \
             **on paper, in order**. Never screenshot or store them digitally.",
            &[
                "Anyone with these words controls the wallet.",
                "Keep copies in more than one safe place.",
            ],
        ),
        StepDefinition::builtin(
            3,
            "Verify Your Phrase",
            "Pick the correct words for the requested positions to prove your backup is complete.",
            &["Check the position numbers carefully, the options are shuffled."],
        ),
        StepDefinition::builtin(
            4,
            "Your Wallet Address",
            "This is your public address. It is safe to share, like an email address, so \
             people can send you funds.",
            &["Always double-check the first and last characters when pasting an address."],
        ),
        StepDefinition::builtin(
            5,
            "Security Best Practices",
            "Hardware wallets for large amounts, 2FA where available, and never share your \
             seed phrase or private key.",
            &["Nobody legitimate will ever ask for your recovery phrase."],
        ),
        StepDefinition::builtin(
            6,
            "Complete",
            "You have created, backed up and verified a wallet.",
            &[],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(slug: &str, component_type: &str) -> Simulation {
        Simulation {
            id: "id".into(),
            slug: slug.into(),
            title: "T".into(),
            description: String::new(),
            category: String::new(),
            difficulty: String::new(),
            duration: String::new(),
            component_type: component_type.into(),
            order_index: 0,
            icon: String::new(),
            color_scheme: String::new(),
            published: true,
            steps: vec![],
        }
    }

    #[test]
    fn test_wallet_steps_are_ordered() {
        let steps = wallet_creation_steps();
        assert_eq!(steps.len(), 7);
        for (idx, step) in steps.iter().enumerate() {
            assert_eq!(step.order as usize, idx);
            assert!(!step.title.is_empty());
        }
        assert!(!steps.last().unwrap().has_hints());
    }

    #[test]
    fn test_component_type_lookup() {
        assert_eq!(
            SimulationKind::from_component_type("wallet-creation"),
            Some(SimulationKind::WalletCreation)
        );
        assert_eq!(SimulationKind::from_component_type("nft-minting"), None);
        assert_eq!(SimulationKind::WalletCreation.to_string(), "wallet-creation");
    }

    #[test]
    fn test_legacy_slug_lookup() {
        let sim = simulation("create-your-first-wallet", "");
        assert_eq!(SimulationKind::resolve(&sim), Some(SimulationKind::WalletCreation));
        assert_eq!(SimulationKind::from_legacy_slug("other"), None);
    }

    #[test]
    fn test_steps_for_prefers_stored_rows_in_order() {
        let sim = simulation("x", "wallet-creation");
        let stored = vec![
            SimulationStep {
                id: "b".into(),
                step_order: 1,
                title: "Second".into(),
                description: String::new(),
                hints: vec![],
            },
            SimulationStep {
                id: "a".into(),
                step_order: 0,
                title: "First".into(),
                description: String::new(),
                hints: vec!["h".into()],
            },
        ];
        let steps = steps_for(&sim, stored);
        assert_eq!(steps[0].title, "First");
        assert_eq!(steps[1].title, "Second");
    }

    #[test]
    fn test_steps_for_falls_back_to_builtin() {
        let sim = simulation("x", "wallet-creation");
        assert_eq!(steps_for(&sim, vec![]).len(), 7);

        let unknown = simulation("y", "nft-minting");
        assert!(steps_for(&unknown, vec![]).is_empty());
    }
}
