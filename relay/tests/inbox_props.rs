use poi_relay::{Delivery, Envelope, Inbox, Message, Outbox};
use poi_types::{Address, ChainId};
use proptest::prelude::*;
use std::collections::HashSet;

fn envelope(nonce: u64) -> Envelope {
    let mut outbox = Outbox::new(ChainId::DEV_EXECUTION, Address::derive("auction"), ChainId::DEV_SETTLEMENT);
    outbox
        .push(Message::Resolution {
            poi_id: 1,
            validator: Address::derive("v"),
            proof: vec![],
        })
        .unwrap();
    let mut env = outbox.drain().remove(0);
    env.nonce = nonce;
    env
}

proptest! {
    /// With room for every delivery, exactly one copy of each nonce is fresh.
    #[test]
    fn each_nonce_is_fresh_once(nonces in prop::collection::vec(0u64..64, 0..200)) {
        let mut inbox = Inbox::default();
        let fresh = nonces
            .iter()
            .filter(|n| inbox.accept(&envelope(**n)) == Delivery::Fresh)
            .count();
        let distinct: HashSet<u64> = nonces.iter().copied().collect();
        prop_assert_eq!(fresh, distinct.len());
        prop_assert_eq!(inbox.len(), distinct.len());
    }

    /// Decoding arbitrary bytes never panics.
    #[test]
    fn decode_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Envelope::decode(&bytes);
    }
}
