//! Grouping holdings into per-chain exit work

use crate::scanner::Holding;
use crate::tokens::{StablecoinTarget, TokenRegistry, NATIVE_ASSET};
use std::collections::BTreeMap;

/// What the exit does with one holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingAction {
    /// Already the chain's stablecoin
    AlreadyTarget,
    /// Native currency; swapping it would need a wrap step first
    Native,
    Swap,
}

impl HoldingAction {
    pub fn classify(holding: &Holding, target: &StablecoinTarget) -> Self {
        if holding.address == target.address {
            Self::AlreadyTarget
        } else if holding.address == NATIVE_ASSET {
            Self::Native
        } else {
            Self::Swap
        }
    }
}

/// Holdings on one chain and the stablecoin they exit into
#[derive(Debug, Clone)]
pub struct ChainGroup {
    pub chain_id: u64,
    pub target: StablecoinTarget,
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Clone, Default)]
pub struct ExitPlan {
    /// Ascending chain id
    pub groups: Vec<ChainGroup>,
    /// Holdings on chains without a configured stablecoin
    pub unsupported: Vec<Holding>,
}

impl ExitPlan {
    pub fn build(holdings: &[Holding], registry: &TokenRegistry) -> Self {
        let mut by_chain: BTreeMap<u64, Vec<Holding>> = BTreeMap::new();
        for holding in holdings {
            by_chain
                .entry(holding.chain_id)
                .or_default()
                .push(holding.clone());
        }

        let mut plan = Self::default();
        for (chain_id, holdings) in by_chain {
            match registry.default_stablecoin(chain_id) {
                Some(target) => plan.groups.push(ChainGroup {
                    chain_id,
                    target: *target,
                    holdings,
                }),
                None => plan.unsupported.extend(holdings),
            }
        }
        plan
    }

    pub fn holding_count(&self) -> usize {
        self.groups.iter().map(|g| g.holdings.len()).sum::<usize>() + self.unsupported.len()
    }

    /// Two steps (approve, swap) per holding
    pub fn total_steps(&self) -> usize {
        self.holding_count() * 2
    }
}
