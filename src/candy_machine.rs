use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_lang::AccountDeserialize;
use solana_client::nonblocking::rpc_client::RpcClient;

pub use mpl_candy_machine::ID as CANDY_MACHINE_ID;
use mpl_candy_machine::{CandyMachine, WhitelistMintSettings};

use crate::chain::ChainError;

/// What the mint transaction needs to know about the candy machine.
#[derive(Debug, Clone)]
pub struct CandyMachineHandle {
    pub candy_machine_id: Pubkey,
    /// Treasury wallet the mint price is paid to.
    pub wallet: Pubkey,
    pub price: u64,
    pub token_mint: Option<Pubkey>,
    pub whitelist_mint_settings: Option<WhitelistMintSettings>,
    pub has_gatekeeper: bool,
}

impl CandyMachineHandle {
    pub fn new(candy_machine_id: Pubkey, wallet: Pubkey) -> Self {
        CandyMachineHandle {
            candy_machine_id,
            wallet,
            price: 0,
            token_mint: None,
            whitelist_mint_settings: None,
            has_gatekeeper: false,
        }
    }
}

/// Point-in-time read of the candy machine counters and configuration.
#[derive(Debug, Clone)]
pub struct CandyMachineSnapshot {
    pub items_available: u64,
    pub items_redeemed: u64,
    /// Always `items_available - items_redeemed`.
    pub items_remaining: u64,
    /// Unix timestamp (seconds); `None` when the candy machine has no go-live date.
    pub go_live_date: Option<i64>,
    pub program_handle: CandyMachineHandle,
}

impl CandyMachineSnapshot {
    pub fn new(
        program_handle: CandyMachineHandle,
        items_available: u64,
        items_redeemed: u64,
        go_live_date: Option<i64>,
    ) -> Self {
        CandyMachineSnapshot {
            items_available,
            items_redeemed,
            items_remaining: items_available.saturating_sub(items_redeemed),
            go_live_date,
            program_handle,
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.items_remaining == 0
    }

    pub fn candy_machine_id(&self) -> Pubkey {
        self.program_handle.candy_machine_id
    }
}

pub fn snapshot_from_state(
    candy_machine_id: &Pubkey,
    state: &CandyMachine,
) -> CandyMachineSnapshot {
    let data = &state.data;

    let handle = CandyMachineHandle {
        candy_machine_id: *candy_machine_id,
        wallet: state.wallet,
        price: data.price,
        token_mint: state.token_mint,
        whitelist_mint_settings: data.whitelist_mint_settings.clone(),
        has_gatekeeper: data.gatekeeper.is_some(),
    };

    CandyMachineSnapshot::new(
        handle,
        data.items_available,
        state.items_redeemed,
        data.go_live_date,
    )
}

pub async fn get_candy_machine_state(
    client: &RpcClient,
    candy_machine_id: &Pubkey,
) -> Result<CandyMachine, ChainError> {
    let data = client
        .get_account_data(candy_machine_id)
        .await
        .map_err(|err| ChainError::message(err.to_string()))?;

    CandyMachine::try_deserialize(&mut data.as_slice()).map_err(|err| {
        ChainError::message(format!(
            "Failed to deserialize candy machine {}: {}",
            candy_machine_id, err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_available_minus_redeemed() {
        let handle = CandyMachineHandle::new(Pubkey::new_unique(), Pubkey::new_unique());
        let snapshot = CandyMachineSnapshot::new(handle.clone(), 400, 150, None);
        assert_eq!(snapshot.items_remaining, 250);
        assert!(!snapshot.is_sold_out());

        let snapshot = CandyMachineSnapshot::new(handle, 400, 400, Some(0));
        assert_eq!(snapshot.items_remaining, 0);
        assert!(snapshot.is_sold_out());
    }

    #[test]
    fn program_id_is_candy_machine_v2() {
        assert_eq!(
            CANDY_MACHINE_ID.to_string(),
            crate::constants::CANDY_MACHINE_V2
        );
    }

    #[test]
    fn snapshot_reads_account_fields() {
        let id = Pubkey::new_unique();
        let mut state = CandyMachine {
            wallet: Pubkey::new_unique(),
            items_redeemed: 12,
            ..Default::default()
        };
        state.data.items_available = 20;
        state.data.price = 700_000_000;
        state.data.go_live_date = Some(1_640_995_200);

        let snapshot = snapshot_from_state(&id, &state);

        assert_eq!(snapshot.candy_machine_id(), id);
        assert_eq!(snapshot.items_available, 20);
        assert_eq!(snapshot.items_redeemed, 12);
        assert_eq!(snapshot.items_remaining, 8);
        assert_eq!(snapshot.go_live_date, Some(1_640_995_200));
        assert_eq!(snapshot.program_handle.wallet, state.wallet);
        assert_eq!(snapshot.program_handle.price, 700_000_000);
        assert!(!snapshot.program_handle.has_gatekeeper);
    }
}
