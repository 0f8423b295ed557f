use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::{AccountMeta, Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction, system_program, sysvar,
    transaction::{Transaction, TransactionError},
};
use anchor_lang::{InstructionData, ToAccountMetas};
use async_trait::async_trait;
use mpl_candy_machine::{accounts as nft_accounts, instruction as nft_instruction, WhitelistMintMode};
use mpl_token_metadata::ID as TOKEN_METADATA_PROGRAM_ID;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use spl_token::{
    instruction::{approve, initialize_mint, mint_to, revoke},
    ID as TOKEN_PROGRAM_ID,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::candy_machine::{
    get_candy_machine_state, snapshot_from_state, CandyMachineHandle, CandyMachineSnapshot,
    CANDY_MACHINE_ID,
};
use crate::chain::{candy_error, CandyMachineClient, ChainError, ConfirmationError};
use crate::constants::{
    CANDY_MACHINE_EMPTY_CODE, CANDY_MACHINE_NOT_LIVE_CODE, CONFIRMATION_POLL_INTERVAL_MS,
    MINT_LAYOUT,
};
use crate::pdas::*;

/// [`CandyMachineClient`] backed by a Solana RPC node, signing with the
/// session keypair.
pub struct RpcCandyMachineClient {
    client: Arc<RpcClient>,
    payer: Arc<Keypair>,
    /// Revokes to send once the keyed mint transaction is confirmed.
    pending_cleanup: Mutex<HashMap<Signature, Vec<Instruction>>>,
}

impl RpcCandyMachineClient {
    pub fn new(client: Arc<RpcClient>, payer: Keypair) -> Self {
        RpcCandyMachineClient {
            client,
            payer: Arc::new(payer),
            pending_cleanup: Mutex::new(HashMap::new()),
        }
    }

    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    async fn build_mint_transaction(
        &self,
        candy_machine: &CandyMachineHandle,
    ) -> Result<(Transaction, Vec<Instruction>), ChainError> {
        let payer = self.payer.pubkey();
        let nft_mint = Keypair::new();

        // Allocate memory for the account
        let min_rent = self
            .client
            .get_minimum_balance_for_rent_exemption(MINT_LAYOUT as usize)
            .await
            .map_err(chain_error)?;

        let whitelist_token_exists = match &candy_machine.whitelist_mint_settings {
            Some(wl_mint_settings) if wl_mint_settings.mode == WhitelistMintMode::BurnEveryTime => {
                let whitelist_token = get_ata_for_mint(&wl_mint_settings.mint, &payer);
                self.client
                    .get_account_with_commitment(&whitelist_token, self.client.commitment())
                    .await
                    .map_err(chain_error)?
                    .value
                    .map(|account| !account.data.is_empty())
                    .unwrap_or(false)
            }
            _ => false,
        };

        let MintInstructions {
            instructions,
            cleanup_instructions,
            signers: additional_signers,
        } = mint_instructions(
            candy_machine,
            &payer,
            &nft_mint.pubkey(),
            min_rent,
            whitelist_token_exists,
        )?;

        let recent_blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(chain_error)?;

        let mut signers: Vec<&Keypair> = vec![&*self.payer, &nft_mint];
        signers.extend(additional_signers.iter());

        let tx = Transaction::new_signed_with_payer(
            &instructions,
            Some(&payer),
            &signers,
            recent_blockhash,
        );

        Ok((tx, cleanup_instructions))
    }

    /// Revokes the token delegations approved for a confirmed mint.
    async fn send_cleanup(&self, signature: &Signature, cleanup_instructions: Vec<Instruction>) {
        let payer = self.payer.pubkey();

        let recent_blockhash = match self.client.get_latest_blockhash().await {
            Ok(blockhash) => blockhash,
            Err(err) => {
                warn!("Could not revoke delegations of {}: {}", signature, err);
                return;
            }
        };

        let tx = Transaction::new_signed_with_payer(
            &cleanup_instructions,
            Some(&payer),
            &[&*self.payer],
            recent_blockhash,
        );

        match self.client.send_transaction(&tx).await {
            Ok(cleanup_signature) => {
                info!("Delegations of {} revoked in {}", signature, cleanup_signature)
            }
            Err(err) => warn!("Could not revoke delegations of {}: {}", signature, err),
        }
    }

    async fn poll_signature_status(
        &self,
        signature: &Signature,
        timeout: Duration,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>, ConfirmationError> {
        let deadline = Instant::now() + timeout;
        let mut last_error: Option<ChainError> = None;

        while Instant::now() < deadline {
            match self.client.get_signature_statuses(&[*signature]).await {
                Ok(response) => {
                    last_error = None;
                    if let Some(Some(status)) = response.value.into_iter().next() {
                        if status.err.is_some() {
                            debug!("Transaction {} failed: {:?}", signature, status.err);
                            return Ok(status.err);
                        }
                        if status.satisfies_commitment(commitment) {
                            debug!("Transaction {} confirmed", signature);
                            return Ok(None);
                        }
                    }
                }
                Err(err) => {
                    warn!("Failed to fetch status of {}: {}", signature, err);
                    last_error = Some(chain_error(err));
                }
            }

            sleep(Duration::from_millis(CONFIRMATION_POLL_INTERVAL_MS)).await;
        }

        match last_error {
            Some(err) => Err(ConfirmationError::Rpc(err)),
            None => Err(ConfirmationError::Timeout(timeout.as_millis() as u64)),
        }
    }

    fn take_cleanup(&self, signature: &Signature) -> Option<Vec<Instruction>> {
        self.pending_cleanup
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(signature)
    }
}

/// Instructions of a single mint transaction. The candy machine program
/// rejects any instruction after `MintNft` other than the collection one,
/// so delegation revokes are returned separately.
pub struct MintInstructions {
    pub instructions: Vec<Instruction>,
    pub cleanup_instructions: Vec<Instruction>,
    /// Throwaway authorities that must sign next to the payer and the mint.
    pub signers: Vec<Keypair>,
}

pub fn mint_instructions(
    candy_machine: &CandyMachineHandle,
    payer: &Pubkey,
    nft_mint: &Pubkey,
    min_rent: u64,
    whitelist_token_exists: bool,
) -> Result<MintInstructions, ChainError> {
    let mut instructions = vec![
        system_instruction::create_account(
            payer,
            nft_mint,
            min_rent,
            MINT_LAYOUT,
            &TOKEN_PROGRAM_ID,
        ),
        initialize_mint(&TOKEN_PROGRAM_ID, nft_mint, payer, Some(payer), 0)
            .map_err(program_error)?,
        create_associated_token_account(payer, payer, nft_mint, &TOKEN_PROGRAM_ID),
        mint_to(
            &TOKEN_PROGRAM_ID,
            nft_mint,
            &get_associated_token_address(payer, nft_mint),
            payer,
            &[],
            1,
        )
        .map_err(program_error)?,
    ];

    let mut cleanup_instructions: Vec<Instruction> = Vec::new();
    let mut additional_accounts: Vec<AccountMeta> = Vec::new();
    let mut signers: Vec<Keypair> = Vec::new();

    if let Some(wl_mint_settings) = &candy_machine.whitelist_mint_settings {
        let whitelist_token = get_ata_for_mint(&wl_mint_settings.mint, payer);

        additional_accounts.push(AccountMeta::new(whitelist_token, false));

        if wl_mint_settings.mode == WhitelistMintMode::BurnEveryTime {
            let whitelist_burn_authority = Keypair::new();

            additional_accounts.push(AccountMeta::new(wl_mint_settings.mint, false));
            additional_accounts.push(AccountMeta::new_readonly(
                whitelist_burn_authority.pubkey(),
                true,
            ));

            if whitelist_token_exists {
                instructions.push(
                    approve(
                        &TOKEN_PROGRAM_ID,
                        &whitelist_token,
                        &whitelist_burn_authority.pubkey(),
                        payer,
                        &[],
                        1,
                    )
                    .map_err(program_error)?,
                );
                cleanup_instructions.push(
                    revoke(&TOKEN_PROGRAM_ID, &whitelist_token, payer, &[])
                        .map_err(program_error)?,
                );
            }

            signers.push(whitelist_burn_authority);
        }
    }

    if let Some(token_mint) = candy_machine.token_mint {
        let transfer_authority = Keypair::new();
        let user_paying_account_address = get_ata_for_mint(&token_mint, payer);

        additional_accounts.push(AccountMeta::new(user_paying_account_address, false));
        additional_accounts.push(AccountMeta::new_readonly(
            transfer_authority.pubkey(),
            true,
        ));

        instructions.push(
            approve(
                &TOKEN_PROGRAM_ID,
                &user_paying_account_address,
                &transfer_authority.pubkey(),
                payer,
                &[],
                candy_machine.price,
            )
            .map_err(program_error)?,
        );
        cleanup_instructions.push(
            revoke(&TOKEN_PROGRAM_ID, &user_paying_account_address, payer, &[])
                .map_err(program_error)?,
        );

        signers.push(transfer_authority);
    }

    let (candy_machine_creator, creator_bump) =
        find_candy_machine_creator_pda(&candy_machine.candy_machine_id);

    let mut accounts = nft_accounts::MintNFT {
        candy_machine: candy_machine.candy_machine_id,
        candy_machine_creator,
        payer: *payer,
        wallet: candy_machine.wallet,
        metadata: find_metadata_pda(nft_mint),
        mint: *nft_mint,
        mint_authority: *payer,
        update_authority: *payer,
        master_edition: find_master_edition_pda(nft_mint),
        token_metadata_program: TOKEN_METADATA_PROGRAM_ID,
        token_program: TOKEN_PROGRAM_ID,
        system_program: system_program::id(),
        rent: sysvar::rent::ID,
        clock: sysvar::clock::ID,
        recent_blockhashes: sysvar::slot_hashes::ID,
        instruction_sysvar_account: sysvar::instructions::ID,
    }
    .to_account_metas(None);
    accounts.extend(additional_accounts);

    // must stay the last instruction of the transaction
    instructions.push(Instruction {
        program_id: CANDY_MACHINE_ID,
        accounts,
        data: nft_instruction::MintNft { creator_bump }.data(),
    });

    Ok(MintInstructions {
        instructions,
        cleanup_instructions,
        signers,
    })
}

#[async_trait]
impl CandyMachineClient for RpcCandyMachineClient {
    async fn get_candy_machine_state(
        &self,
        candy_machine_id: &Pubkey,
    ) -> Result<CandyMachineSnapshot, ChainError> {
        debug!("Fetching candy machine {}", candy_machine_id);
        let state = get_candy_machine_state(&self.client, candy_machine_id).await?;
        Ok(snapshot_from_state(candy_machine_id, &state))
    }

    async fn mint_one_token(
        &self,
        candy_machine: &CandyMachineHandle,
        config: &Pubkey,
        payer: &Pubkey,
        treasury: &Pubkey,
    ) -> Result<Signature, ChainError> {
        if *payer != self.payer.pubkey() {
            return Err(ChainError::message(format!(
                "Payer {} does not match the session keypair {}",
                payer,
                self.payer.pubkey()
            )));
        }
        if *config != candy_machine.candy_machine_id {
            return Err(ChainError::message(format!(
                "Config {} is not held by candy machine {}",
                config, candy_machine.candy_machine_id
            )));
        }
        if *treasury != candy_machine.wallet {
            return Err(ChainError::message(format!(
                "Treasury {} does not match the candy machine wallet {}",
                treasury, candy_machine.wallet
            )));
        }
        if candy_machine.has_gatekeeper {
            return Err(ChainError::message(
                "Candy machines with a gatekeeper are not supported",
            ));
        }

        let (tx, cleanup_instructions) = self.build_mint_transaction(candy_machine).await?;
        let signature = self
            .client
            .send_transaction(&tx)
            .await
            .map_err(chain_error)?;

        info!("Mint transaction sent: {}", signature);

        if !cleanup_instructions.is_empty() {
            self.pending_cleanup
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(signature, cleanup_instructions);
        }

        Ok(signature)
    }

    async fn await_transaction_signature_confirmation(
        &self,
        signature: &Signature,
        timeout: Duration,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>, ConfirmationError> {
        let result = self
            .poll_signature_status(signature, timeout, commitment)
            .await;

        // a failed mint reverts its approvals, the revokes only follow a confirmed one
        if let Some(cleanup_instructions) = self.take_cleanup(signature) {
            if matches!(result, Ok(None)) {
                self.send_cleanup(signature, cleanup_instructions).await;
            }
        }

        result
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ChainError> {
        self.client.get_balance(address).await.map_err(chain_error)
    }
}

/// Keeps the program error code when the node reports one (e.g. a failed
/// preflight simulation). Candy machine codes carry the program's message and
/// the legacy sold out and not live codes are kept bare. Any other code is
/// carried as the node's text, which holds the hex error id.
pub fn chain_error(err: ClientError) -> ChainError {
    match err.get_transaction_error() {
        Some(TransactionError::InstructionError(_, InstructionError::Custom(code))) => {
            if let Some(error) = candy_error(code) {
                ChainError::Program {
                    code,
                    msg: Some(error.to_string()),
                }
            } else if code == CANDY_MACHINE_EMPTY_CODE || code == CANDY_MACHINE_NOT_LIVE_CODE {
                ChainError::program(code)
            } else {
                ChainError::message(err.to_string())
            }
        }
        _ => ChainError::message(err.to_string()),
    }
}

fn program_error<E: std::fmt::Display>(err: E) -> ChainError {
    ChainError::message(err.to_string())
}
