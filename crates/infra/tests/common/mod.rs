#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;

use stockval_accounting::{Journal, JournalEntryPosted, JournalKind};
use stockval_core::{AccountId, CategoryId, CompanyId, JournalId, ProductId};
use stockval_infra::adapters::{
    EventSourcedLedger, InMemoryAuditLog, InMemoryProductCatalog, InMemorySequenceGenerator,
    InMemoryValuationConfig,
};
use stockval_infra::config::SequenceSettings;
use stockval_infra::event_store::InMemoryEventStore;
use stockval_infra::{PickingValuationService, RevaluationService, Settings, ValuationPorts};
use stockval_inventory::{Product, ProductCatalog, ProductCategory};

pub type Store = Arc<InMemoryEventStore>;

/// One company wired to in-memory adapters.
pub struct World {
    pub company: CompanyId,
    pub store: Store,
    pub ports: ValuationPorts,
    pub journal: Journal,
    pub valuation_account: AccountId,
    pub catalog: Arc<InMemoryProductCatalog>,
    pub config: Arc<InMemoryValuationConfig>,
    pub ledger: Arc<EventSourcedLedger<Store>>,
    pub audit: Arc<InMemoryAuditLog>,
    pub revaluations: RevaluationService<Store>,
    pub pickings: PickingValuationService<Store>,
}

impl World {
    /// A company whose valuation journal is found by name.
    pub fn new() -> Self {
        let world = Self::without_journal();
        world.config.add_journal(world.journal.clone());
        world
    }

    /// A company with no valuation journal at all.
    pub fn without_journal() -> Self {
        let settings = Settings::default();
        settings.init_logging();
        let company = CompanyId::new();
        let store: Store = Arc::new(InMemoryEventStore::new());

        let catalog = Arc::new(InMemoryProductCatalog::new());
        let config = Arc::new(InMemoryValuationConfig::new());
        let ledger = Arc::new(EventSourcedLedger::new(store.clone()));
        let audit = Arc::new(InMemoryAuditLog::new());
        let sequences = Arc::new(InMemorySequenceGenerator::from_settings(&SequenceSettings::default()));

        let ports = ValuationPorts {
            catalog: catalog.clone(),
            config: config.clone(),
            poster: ledger.clone(),
            sequences,
            audit: audit.clone(),
        };
        let currency = settings.currency.currency();

        config.add_journal(Journal {
            id: JournalId::new(),
            company,
            code: "MISC".to_string(),
            name: "Miscellaneous Operations".to_string(),
            kind: JournalKind::General,
        });

        Self {
            company,
            store: store.clone(),
            ports: ports.clone(),
            journal: Journal {
                id: JournalId::new(),
                company,
                code: "STJ".to_string(),
                name: "Inventory Valuation".to_string(),
                kind: JournalKind::General,
            },
            valuation_account: AccountId::new(),
            catalog,
            config,
            ledger,
            audit,
            revaluations: RevaluationService::new(store.clone(), ports.clone(), currency.clone()),
            pickings: PickingValuationService::new(store, ports, currency),
        }
    }

    /// A storable product valued on the shared valuation account.
    pub fn product(&self, name: &str, qty: Decimal, cost: Decimal) -> ProductId {
        self.product_with(name, qty, cost, true, Some(self.valuation_account))
    }

    pub fn product_with(
        &self,
        name: &str,
        qty: Decimal,
        cost: Decimal,
        storable: bool,
        category_account: Option<AccountId>,
    ) -> ProductId {
        let id = ProductId::new();
        self.catalog.upsert(
            self.company,
            Product {
                id,
                display_name: name.to_string(),
                storable,
                qty_available: qty,
                standard_price: cost,
                valuation_account: None,
                category: ProductCategory {
                    id: CategoryId::new(),
                    name: "All/Saleable".to_string(),
                    valuation_account: category_account,
                },
            },
        );
        id
    }

    pub fn standard_price(&self, product: ProductId) -> Decimal {
        self.catalog.product(self.company, product).unwrap().standard_price
    }

    pub fn posted_entries(&self) -> Vec<JournalEntryPosted> {
        self.ledger.posted_entries(self.company).unwrap()
    }
}
