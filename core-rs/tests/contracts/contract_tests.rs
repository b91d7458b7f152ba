//! Contract Tests - Reconciliation Invariant Protection
//!
//! This file aggregates all contract test modules.
//! Contract tests verify invariants that MUST NEVER BREAK: a dashboard
//! that silently miscounts is worse than one that fails.

// Contract test modules
mod contracts {
    // Query text contracts (date typing, filter clauses, determinism)
    mod query_builder {
        include!("query_builder_contracts.rs");
    }

    // Reconciliation contracts (counts, breakdowns, unknown labels)
    mod reconciliation {
        include!("reconciliation_contracts.rs");
    }

    // Remote fetch contracts (typed failures, never zero)
    mod fetch {
        include!("fetch_contracts.rs");
    }
}
