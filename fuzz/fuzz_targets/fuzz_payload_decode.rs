// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

#![no_main]

use attestpool_core::{ClaimBody, ClaimKind};
use libfuzzer_sys::fuzz_target;

const MAX_TEXT: usize = 256;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let kind = ClaimKind::MULTI_POOL[usize::from(selector) % ClaimKind::MULTI_POOL.len()];
    if let Ok(body) = ClaimBody::decode(kind, payload, MAX_TEXT) {
        assert_eq!(body.kind(), kind);
        // Decoding consumes the whole payload, so the canonical encoding is
        // the input itself.
        assert_eq!(body.encode().ok().as_deref(), Some(payload));
    }
});
