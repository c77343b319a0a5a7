#![no_main]

use arbitrary::Arbitrary;
use bitcoin::hashes::Hash;
use bitcoin::{Amount, OutPoint, Txid};
use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stochastic_coin_selection::{Candidate, CoinSelector, ConfirmationPolicy, SelectionRequest};

#[derive(Arbitrary, Debug)]
pub struct Coin {
    value: u64,
    confirmations: u32,
    from_self: bool,
}

#[derive(Arbitrary, Debug)]
pub struct Params {
    target: u64,
    dust_threshold: u64,
    min_conf_self: u32,
    min_conf_others: u32,
    seed: u64,
    coins: Vec<Coin>,
}

fuzz_target!(|params: Params| {
    let Params { target, dust_threshold, min_conf_self, min_conf_others, seed, coins } = params;

    let pool: Vec<Candidate> = coins
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let outpoint = OutPoint::new(Txid::all_zeros(), i as u32);
            Candidate::new(outpoint, Amount::from_sat(c.value), c.confirmations, c.from_self)
        })
        .collect();

    let policy = ConfirmationPolicy::new(min_conf_self, min_conf_others);
    let request = SelectionRequest::new(Amount::from_sat(target)).with_policy(policy);
    let selector = CoinSelector::new()
        .with_dust_threshold(Amount::from_sat(dust_threshold))
        .with_iterations(50);

    if let Ok(result) = selector.select(&pool, &request, &mut StdRng::seed_from_u64(seed)) {
        if result.success {
            assert!(result.total_value >= result.target);
        }
    }
});
