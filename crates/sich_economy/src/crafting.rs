//! # Crafting Engine
//!
//! **Transactional recipes and cooldown-gated search**
//!
//! ## Guarantees
//!
//! 1. **Transactional**: a craft burns every input and mints the item, or
//!    touches nothing. All preconditions (balances, roles, id counter) are
//!    checked while the ledgers are locked, before the first mutation.
//! 2. **No duplication**: items only come from burned resources.
//! 3. **Fixed recipes**: the recipe book is built once and never edited.
//!
//! ## Search state machine
//!
//! ```text
//!   Ready ──search()──> Cooling ──cooldown elapses──> Ready
//! ```
//!
//! A player with no recorded search is `Ready`.
//!
//! ## Lock order
//!
//! engine → resources → item registry. The engine itself sits behind an
//! [`EngineHandle`], so at most one craft or search runs at a time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sich_shared::{
    ItemKind, ResourceId, TokenId, DEFAULT_SEARCH_COOLDOWN_SECS, DIAMOND, GOLD, IRON, LEATHER,
    RESOURCE_TYPE_COUNT, WOOD,
};

use crate::access::{AccessControl, Role};
use crate::clock::Clock;
use crate::entropy::EntropySource;
use crate::error::{EconomyError, EconomyResult};
use crate::events::{EventJournal, LedgerEvent};
use crate::items::{ItemHandle, ItemRegistry};
use crate::resources::{ResourceHandle, ResourceLedger};
use crate::search::YieldTable;

/// Shared, single-writer handle to the crafting engine.
pub type EngineHandle = Arc<Mutex<CraftingEngine>>;

// ============================================================================
// Recipes
// ============================================================================

/// One resource requirement of a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeItem {
    /// Resource consumed.
    pub resource: ResourceId,
    /// Quantity consumed.
    pub quantity: u64,
}

impl RecipeItem {
    /// Creates a recipe item.
    #[inline]
    #[must_use]
    pub const fn new(resource: ResourceId, quantity: u64) -> Self {
        Self { resource, quantity }
    }
}

/// The inputs that produce one item of a kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Item produced.
    pub kind: ItemKind,
    /// Resources consumed, in display order.
    pub inputs: Vec<RecipeItem>,
}

impl Recipe {
    /// Creates a recipe with basic validation.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty input list, a zero quantity, an unknown
    /// resource type, or a resource listed twice.
    pub fn new(kind: ItemKind, inputs: Vec<RecipeItem>) -> EconomyResult<Self> {
        if inputs.is_empty() {
            return Err(EconomyError::InvalidArgument(format!(
                "recipe for {kind} must have at least one input"
            )));
        }
        for (i, input) in inputs.iter().enumerate() {
            if input.quantity == 0 || input.resource.get() >= RESOURCE_TYPE_COUNT {
                return Err(EconomyError::InvalidArgument(format!(
                    "recipe for {kind} has an invalid input {}",
                    input.resource
                )));
            }
            if inputs[..i].iter().any(|prev| prev.resource == input.resource) {
                return Err(EconomyError::InvalidArgument(format!(
                    "recipe for {kind} lists {} twice",
                    input.resource
                )));
            }
        }
        Ok(Self { kind, inputs })
    }

    /// Resource types, in input order.
    #[must_use]
    pub fn resources(&self) -> Vec<ResourceId> {
        self.inputs.iter().map(|i| i.resource).collect()
    }

    /// Quantities, in input order.
    #[must_use]
    pub fn quantities(&self) -> Vec<u64> {
        self.inputs.iter().map(|i| i.quantity).collect()
    }
}

/// One recipe per item kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeBook {
    recipes: HashMap<ItemKind, Recipe>,
}

impl RecipeBook {
    /// The four recipes of the game.
    ///
    /// | Item | Inputs |
    /// |---|---|
    /// | Cossack Sabre | Iron×3, Wood×1, Leather×1 |
    /// | Elder Staff | Wood×2, Gold×1, Diamond×1 |
    /// | Characternyk Armor | Leather×4, Iron×2, Gold×1 |
    /// | Battle Bracelet | Iron×4, Gold×2, Diamond×2 |
    #[must_use]
    pub fn standard() -> Self {
        let table = [
            (ItemKind::CossackSabre, vec![(IRON, 3), (WOOD, 1), (LEATHER, 1)]),
            (ItemKind::ElderStaff, vec![(WOOD, 2), (GOLD, 1), (DIAMOND, 1)]),
            (ItemKind::CharacternykArmor, vec![(LEATHER, 4), (IRON, 2), (GOLD, 1)]),
            (ItemKind::BattleBracelet, vec![(IRON, 4), (GOLD, 2), (DIAMOND, 2)]),
        ];
        let recipes = table
            .into_iter()
            .map(|(kind, inputs)| {
                let inputs = inputs
                    .into_iter()
                    .map(|(resource, quantity)| RecipeItem::new(resource, quantity))
                    .collect();
                (kind, Recipe { kind, inputs })
            })
            .collect();
        Self { recipes }
    }

    /// Recipe for `kind`.
    #[must_use]
    pub fn get(&self, kind: ItemKind) -> Option<&Recipe> {
        self.recipes.get(&kind)
    }

    /// Every recipe, in [`ItemKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        ItemKind::ALL.iter().filter_map(|kind| self.recipes.get(kind))
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of a successful craft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CraftReceipt {
    /// The crafter.
    pub player: Address,
    /// Item kind produced.
    pub kind: ItemKind,
    /// Newly minted token.
    pub token_id: TokenId,
    /// Resources burned.
    pub consumed: Vec<RecipeItem>,
}

/// Result of a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The searcher.
    pub player: Address,
    /// Time recorded as the player's last search.
    pub timestamp: u64,
    /// Resources granted, sorted by type. May be empty.
    pub yields: Vec<(ResourceId, u64)>,
    /// Earliest time of the next successful search.
    pub next_search_at: u64,
}

impl SearchOutcome {
    /// Total units granted across all types.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.yields.iter().fold(0u64, |acc, (_, q)| acc.saturating_add(*q))
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Executes recipes and searches against the resource ledger and the four
/// item registries.
pub struct CraftingEngine {
    address: Address,
    access: AccessControl,
    recipes: RecipeBook,
    resources: ResourceHandle,
    /// Indexed by [`ItemKind::index`].
    items: [ItemHandle; 4],
    yields: YieldTable,
    cooldown_secs: u64,
    last_search: HashMap<Address, u64>,
    clock: Arc<dyn Clock>,
    entropy: Box<dyn EntropySource>,
    journal: EventJournal,
}

impl fmt::Debug for CraftingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CraftingEngine")
            .field("address", &self.address)
            .field("cooldown_secs", &self.cooldown_secs)
            .field("searchers", &self.last_search.len())
            .finish_non_exhaustive()
    }
}

impl CraftingEngine {
    /// Creates an engine with the standard recipes, the uniform yield table
    /// and the default cooldown.
    ///
    /// `items` must hold one registry per kind in [`ItemKind::ALL`] order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if a registry sits in the wrong slot.
    pub fn new(
        address: Address,
        admin: Address,
        resources: ResourceHandle,
        items: [ItemHandle; 4],
        clock: Arc<dyn Clock>,
        entropy: Box<dyn EntropySource>,
    ) -> EconomyResult<Self> {
        for (expected, handle) in ItemKind::ALL.iter().zip(&items) {
            let actual = handle.lock().kind();
            if actual != *expected {
                return Err(EconomyError::InvalidArgument(format!(
                    "registry slot for {expected} holds {actual}"
                )));
            }
        }

        Ok(Self {
            address,
            access: AccessControl::new(address, admin),
            recipes: RecipeBook::standard(),
            resources,
            items,
            yields: YieldTable::uniform(),
            cooldown_secs: DEFAULT_SEARCH_COOLDOWN_SECS,
            last_search: HashMap::new(),
            clock,
            entropy,
            journal: EventJournal::new(),
        })
    }

    /// Replaces the search yield table.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the table fails validation.
    pub fn with_yield_table(mut self, yields: YieldTable) -> EconomyResult<Self> {
        yields.validate()?;
        self.yields = yields;
        Ok(self)
    }

    /// Sets the initial search cooldown.
    #[must_use]
    pub const fn with_search_cooldown(mut self, seconds: u64) -> Self {
        self.cooldown_secs = seconds;
        self
    }

    /// Wraps the engine in a shared handle.
    #[must_use]
    pub fn into_handle(self) -> EngineHandle {
        Arc::new(Mutex::new(self))
    }

    /// This engine's principal.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Role table (read-only).
    #[must_use]
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Grants a role on the engine (admin only).
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not an admin.
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> EconomyResult<()> {
        self.access.grant_role(caller, role, account, &mut self.journal)
    }

    /// Revokes a role on the engine (admin only).
    ///
    /// # Errors
    ///
    /// `Unauthorized` or `InvariantViolation` (last admin).
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> EconomyResult<()> {
        self.access.revoke_role(caller, role, account, &mut self.journal)
    }

    /// Drops one of the caller's own roles on the engine.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when renouncing the last admin.
    pub fn renounce_role(&mut self, caller: Address, role: Role) -> EconomyResult<()> {
        self.access.renounce_role(caller, role, &mut self.journal)
    }

    /// The fixed recipe for `kind`.
    #[must_use]
    pub fn recipe(&self, kind: ItemKind) -> Option<&Recipe> {
        self.recipes.get(kind)
    }

    /// The recipe book.
    #[must_use]
    pub const fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    /// The search yield table.
    #[must_use]
    pub const fn yield_table(&self) -> &YieldTable {
        &self.yields
    }

    /// Current search cooldown in seconds.
    #[inline]
    #[must_use]
    pub const fn search_cooldown(&self) -> u64 {
        self.cooldown_secs
    }

    /// Changes the search cooldown (admin only). Applies to future checks,
    /// including players already cooling.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not an engine admin.
    pub fn set_search_cooldown(&mut self, caller: Address, seconds: u64) -> EconomyResult<()> {
        self.access.require(Role::Admin, caller)?;
        self.cooldown_secs = seconds;
        tracing::info!(seconds, "search cooldown set");
        self.journal.record(LedgerEvent::SearchCooldownSet { seconds });
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Time of the player's last successful search, if any.
    #[must_use]
    pub fn last_search(&self, player: Address) -> Option<u64> {
        self.last_search.get(&player).copied()
    }

    /// Seconds until `player` may search again. `0` means ready now.
    #[must_use]
    pub fn cooldown_remaining(&self, player: Address) -> u64 {
        self.remaining_at(player, self.clock.now())
    }

    fn remaining_at(&self, player: Address, now: u64) -> u64 {
        self.last_search.get(&player).map_or(0, |&last| {
            let elapsed = now.saturating_sub(last);
            self.cooldown_secs.saturating_sub(elapsed)
        })
    }

    /// Grants `player` a random handful of resources and starts the cooldown.
    ///
    /// # Errors
    ///
    /// - `CooldownActive` if the last search was less than the cooldown ago
    /// - `InvalidArgument` for the zero address
    /// - `Unauthorized` if the engine lacks `minter` on the resource ledger
    /// - `ArithmeticOverflow` if a balance would overflow
    pub fn search(&mut self, player: Address) -> EconomyResult<SearchOutcome> {
        let now = self.clock.now();
        let remaining_secs = self.remaining_at(player, now);
        if remaining_secs > 0 {
            tracing::debug!(%player, remaining_secs, "search rejected: cooling down");
            return Err(EconomyError::CooldownActive { remaining_secs });
        }
        if player == Address::ZERO {
            return Err(EconomyError::InvalidArgument(
                "zero address cannot search".to_string(),
            ));
        }

        let mut resources = self.resources.lock();
        resources.access().require(Role::Minter, self.address)?;

        let yields = self.yields.roll(self.entropy.as_mut(), player, now);
        if !yields.is_empty() {
            let (ids, quantities): (Vec<ResourceId>, Vec<u64>) = yields.iter().copied().unzip();
            resources.mint_batch(self.address, player, &ids, &quantities)?;
        }
        drop(resources);

        self.last_search.insert(player, now);
        let outcome = SearchOutcome {
            player,
            timestamp: now,
            yields,
            next_search_at: now.saturating_add(self.cooldown_secs),
        };
        tracing::info!(%player, units = outcome.total_units(), "search completed");
        self.journal.record(LedgerEvent::Searched {
            player,
            timestamp: now,
            yields: outcome.yields.clone(),
        });
        Ok(outcome)
    }

    // ========================================================================
    // Crafting
    // ========================================================================

    /// Checks whether `player` could craft `kind` right now (no mutation).
    ///
    /// # Errors
    ///
    /// Whatever [`CraftingEngine::craft`] would fail with.
    pub fn can_craft(&self, player: Address, kind: ItemKind) -> EconomyResult<()> {
        let recipe = self.recipe_for(kind)?;
        let resources = self.resources.lock();
        let items = self.items[kind.index()].lock();
        self.preflight(&resources, &items, player, recipe)
    }

    /// Burns the recipe inputs of `kind` from `player` and mints one item.
    ///
    /// **ATOMIC**: on any error no balance or ownership changes.
    ///
    /// # Errors
    ///
    /// - `InsufficientResources` if any input is short
    /// - `Unauthorized` if the engine lacks `burner` on resources or
    ///   `minter` on the item registry
    /// - `InvalidArgument` for the zero address
    /// - `ArithmeticOverflow` if the registry ran out of ids
    pub fn craft(&mut self, player: Address, kind: ItemKind) -> EconomyResult<CraftReceipt> {
        let recipe = self.recipe_for(kind)?.clone();
        let mut resources = self.resources.lock();
        let mut items = self.items[kind.index()].lock();

        self.preflight(&resources, &items, player, &recipe)?;

        // Neither step can fail once the preflight passed.
        resources.burn_batch(self.address, player, &recipe.resources(), &recipe.quantities())?;
        let token_id = items.mint_to(self.address, player)?;

        tracing::info!(%player, %kind, token_id, "item crafted");
        self.journal.record(LedgerEvent::Crafted {
            player,
            kind,
            token_id,
        });
        Ok(CraftReceipt {
            player,
            kind,
            token_id,
            consumed: recipe.inputs,
        })
    }

    /// Crafts a Cossack Sabre.
    ///
    /// # Errors
    ///
    /// As [`CraftingEngine::craft`].
    pub fn craft_cossack_sabre(&mut self, player: Address) -> EconomyResult<CraftReceipt> {
        self.craft(player, ItemKind::CossackSabre)
    }

    /// Crafts an Elder Staff.
    ///
    /// # Errors
    ///
    /// As [`CraftingEngine::craft`].
    pub fn craft_elder_staff(&mut self, player: Address) -> EconomyResult<CraftReceipt> {
        self.craft(player, ItemKind::ElderStaff)
    }

    /// Crafts Characternyk Armor.
    ///
    /// # Errors
    ///
    /// As [`CraftingEngine::craft`].
    pub fn craft_characternyk_armor(&mut self, player: Address) -> EconomyResult<CraftReceipt> {
        self.craft(player, ItemKind::CharacternykArmor)
    }

    /// Crafts a Battle Bracelet.
    ///
    /// # Errors
    ///
    /// As [`CraftingEngine::craft`].
    pub fn craft_battle_bracelet(&mut self, player: Address) -> EconomyResult<CraftReceipt> {
        self.craft(player, ItemKind::BattleBracelet)
    }

    /// Takes every pending event.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }

    fn recipe_for(&self, kind: ItemKind) -> EconomyResult<&Recipe> {
        self.recipes
            .get(kind)
            .ok_or_else(|| EconomyError::InvariantViolation(format!("no recipe for {kind}")))
    }

    fn preflight(
        &self,
        resources: &ResourceLedger,
        items: &ItemRegistry,
        player: Address,
        recipe: &Recipe,
    ) -> EconomyResult<()> {
        for input in &recipe.inputs {
            let available = resources.balance_of(player, input.resource);
            if available < input.quantity {
                tracing::debug!(
                    %player,
                    kind = %recipe.kind,
                    resource = %input.resource,
                    "craft rejected"
                );
                return Err(EconomyError::InsufficientResources {
                    resource: input.resource,
                    required: input.quantity,
                    available,
                });
            }
        }
        if player == Address::ZERO {
            return Err(EconomyError::InvalidArgument(
                "zero address cannot craft".to_string(),
            ));
        }
        resources.access().require(Role::Burner, self.address)?;
        items.ensure_can_mint(self.address)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entropy::RngEntropy;
    use rand::rngs::mock::StepRng;
    use sich_shared::STONE;

    const ENGINE: Address = Address::repeat_byte(0xD0);
    const ADMIN: Address = Address::repeat_byte(0x01);
    const ALICE: Address = Address::repeat_byte(0x02);

    struct Fixture {
        engine: CraftingEngine,
        resources: ResourceHandle,
        items: [ItemHandle; 4],
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let mut ledger = ResourceLedger::new(Address::repeat_byte(0xE0), "res/", ADMIN);
        ledger.grant_role(ADMIN, Role::Minter, ENGINE).unwrap();
        ledger.grant_role(ADMIN, Role::Burner, ENGINE).unwrap();
        ledger.grant_role(ADMIN, Role::Minter, ADMIN).unwrap();
        let resources = ledger.into_handle();

        let items = ItemKind::ALL.map(|kind| {
            let address = Address::repeat_byte(0xB0 + kind.index() as u8);
            let mut registry = ItemRegistry::new(kind, address, kind.default_uri(), ADMIN);
            registry.grant_role(ADMIN, Role::Minter, ENGINE).unwrap();
            registry.into_handle()
        });

        let clock = Arc::new(ManualClock::new(1_000));
        let engine = CraftingEngine::new(
            ENGINE,
            ADMIN,
            Arc::clone(&resources),
            items.clone(),
            clock.clone(),
            Box::new(RngEntropy::new(StepRng::new(0, 1))),
        )
        .unwrap();

        Fixture {
            engine,
            resources,
            items,
            clock,
        }
    }

    fn give(fixture: &Fixture, grants: &[(ResourceId, u64)]) {
        let mut resources = fixture.resources.lock();
        for &(resource, quantity) in grants {
            resources.mint(ADMIN, ALICE, resource, quantity).unwrap();
        }
    }

    #[test]
    fn test_standard_recipes() {
        let book = RecipeBook::standard();
        let sabre = book.get(ItemKind::CossackSabre).unwrap();
        assert_eq!(sabre.resources(), vec![IRON, WOOD, LEATHER]);
        assert_eq!(sabre.quantities(), vec![3, 1, 1]);

        let bracelet = book.get(ItemKind::BattleBracelet).unwrap();
        assert_eq!(bracelet.quantities(), vec![4, 2, 2]);
        assert_eq!(book.iter().count(), 4);
    }

    #[test]
    fn test_recipe_validation() {
        assert!(Recipe::new(ItemKind::ElderStaff, vec![]).is_err());
        assert!(Recipe::new(ItemKind::ElderStaff, vec![RecipeItem::new(WOOD, 0)]).is_err());
        assert!(Recipe::new(
            ItemKind::ElderStaff,
            vec![RecipeItem::new(WOOD, 1), RecipeItem::new(WOOD, 2)]
        )
        .is_err());
        assert!(Recipe::new(ItemKind::ElderStaff, vec![RecipeItem::new(STONE, 1)]).is_ok());
    }

    #[test]
    fn test_craft_sabre_exact_balance() {
        let mut f = fixture();
        give(&f, &[(IRON, 3), (WOOD, 1), (LEATHER, 1)]);

        let receipt = f.engine.craft_cossack_sabre(ALICE).unwrap();
        assert_eq!(receipt.token_id, 1);

        let resources = f.resources.lock();
        for resource in [IRON, WOOD, LEATHER] {
            assert_eq!(resources.balance_of(ALICE, resource), 0);
        }
        drop(resources);
        assert_eq!(f.items[0].lock().owner_of(1).unwrap(), ALICE);
    }

    #[test]
    fn test_craft_failure_burns_nothing() {
        let mut f = fixture();
        give(&f, &[(IRON, 3), (WOOD, 1)]);

        let result = f.engine.craft(ALICE, ItemKind::CossackSabre);
        assert_eq!(
            result,
            Err(EconomyError::InsufficientResources {
                resource: LEATHER,
                required: 1,
                available: 0,
            })
        );
        let resources = f.resources.lock();
        assert_eq!(resources.balance_of(ALICE, IRON), 3);
        assert_eq!(resources.balance_of(ALICE, WOOD), 1);
        drop(resources);
        assert_eq!(f.items[0].lock().last_minted_token_id(), 0);
    }

    #[test]
    fn test_craft_without_mint_role_burns_nothing() {
        let mut f = fixture();
        give(&f, &[(WOOD, 2), (GOLD, 1), (DIAMOND, 1)]);
        f.items[1]
            .lock()
            .revoke_role(ADMIN, Role::Minter, ENGINE)
            .unwrap();

        let result = f.engine.craft_elder_staff(ALICE);
        assert!(matches!(result, Err(EconomyError::Unauthorized { .. })));
        assert_eq!(f.resources.lock().balance_of(ALICE, WOOD), 2);
    }

    #[test]
    fn test_can_craft_is_dry_run() {
        let f = fixture();
        give(&f, &[(LEATHER, 4), (IRON, 2), (GOLD, 1)]);

        f.engine.can_craft(ALICE, ItemKind::CharacternykArmor).unwrap();
        assert!(f.engine.can_craft(ALICE, ItemKind::BattleBracelet).is_err());
        assert_eq!(f.resources.lock().balance_of(ALICE, LEATHER), 4);
    }

    #[test]
    fn test_search_cooldown_cycle() {
        let mut f = fixture();
        assert_eq!(f.engine.cooldown_remaining(ALICE), 0);

        let outcome = f.engine.search(ALICE).unwrap();
        assert_eq!(outcome.timestamp, 1_000);
        assert_eq!(outcome.next_search_at, 1_060);
        assert_eq!(f.engine.last_search(ALICE), Some(1_000));

        f.clock.advance(59);
        assert_eq!(
            f.engine.search(ALICE),
            Err(EconomyError::CooldownActive { remaining_secs: 1 })
        );

        f.clock.advance(1);
        f.engine.search(ALICE).unwrap();
        assert_eq!(f.engine.last_search(ALICE), Some(1_060));
    }

    #[test]
    fn test_search_mints_rolled_yield() {
        let mut f = fixture();
        let outcome = f.engine.search(ALICE).unwrap();

        let resources = f.resources.lock();
        for (resource, quantity) in &outcome.yields {
            assert_eq!(resources.balance_of(ALICE, *resource), *quantity);
        }
        assert!(outcome.total_units() >= 3);
    }

    #[test]
    fn test_search_without_minter_keeps_player_ready() {
        let mut f = fixture();
        f.resources
            .lock()
            .revoke_role(ADMIN, Role::Minter, ENGINE)
            .unwrap();

        assert!(matches!(
            f.engine.search(ALICE),
            Err(EconomyError::Unauthorized { .. })
        ));
        assert_eq!(f.engine.last_search(ALICE), None);
    }

    #[test]
    fn test_set_search_cooldown_admin_only() {
        let mut f = fixture();
        assert!(f.engine.set_search_cooldown(ALICE, 0).is_err());

        f.engine.set_search_cooldown(ADMIN, 0).unwrap();
        f.engine.search(ALICE).unwrap();
        f.engine.search(ALICE).unwrap();
    }

    #[test]
    fn test_engine_rejects_misordered_registries() {
        let f = fixture();
        let mut swapped = f.items.clone();
        swapped.swap(0, 1);

        let result = CraftingEngine::new(
            ENGINE,
            ADMIN,
            f.resources,
            swapped,
            f.clock,
            Box::new(RngEntropy::new(StepRng::new(0, 1))),
        );
        assert!(matches!(result, Err(EconomyError::InvalidArgument(_))));
    }
}
