// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Instant};

use crate::{
    auth::{PasswordHasher, TokenService},
    providers::n8n::N8nClient,
    storage::Store,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordHasher>,
    pub n8n: N8nClient,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Store,
        tokens: TokenService,
        passwords: PasswordHasher,
        n8n: N8nClient,
    ) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            n8n,
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::storage::database::test_support::temp_store;

    /// State backed by a temporary database and the cheapest bcrypt cost.
    pub fn test_state() -> (AppState, TempDir) {
        let (store, dir) = temp_store();
        let state = AppState::new(
            store,
            TokenService::new("test-secret-for-unit-tests", Duration::from_secs(3600)),
            PasswordHasher::new(4).expect("bcrypt hasher"),
            N8nClient::new(Duration::from_secs(5)).expect("http client"),
        );
        (state, dir)
    }
}
