use std::sync::Arc;

use tracing::debug;

use chain_sol::{decode, generate, Address, Balance, EncodedPrivateKey};
use sol_rpc::{HttpLedgerClient, LedgerClient, RpcConfig, SignatureStatus};

use crate::error::WalletError;
use crate::transfer::{
    with_timeout, TransferOptions, TransferRequest, TransferResult, TransferService,
};

/// A freshly generated wallet. Nothing is persisted; the caller owns the key.
#[derive(Debug)]
pub struct GeneratedWallet {
    pub address: Address,
    pub private_key: EncodedPrivateKey,
}

/// Generate a new keypair. Needs no ledger.
pub fn generate_wallet() -> GeneratedWallet {
    let keypair = generate();
    GeneratedWallet {
        address: keypair.pubkey(),
        private_key: keypair.encode(),
    }
}

/// String-in, typed-out entry point for front ends.
pub struct WalletClient {
    ledger: Arc<dyn LedgerClient>,
    transfers: TransferService<dyn LedgerClient>,
}

impl WalletClient {
    /// Connect to a JSON-RPC node.
    pub fn connect(config: RpcConfig) -> Result<Self, WalletError> {
        debug!(url = %config.url, "connecting");
        let ledger = HttpLedgerClient::new(config)?;
        Ok(Self::with_ledger(Arc::new(ledger)))
    }

    pub fn with_ledger(ledger: Arc<dyn LedgerClient>) -> Self {
        Self::with_options(ledger, TransferOptions::default())
    }

    pub fn with_options(ledger: Arc<dyn LedgerClient>, options: TransferOptions) -> Self {
        let transfers = TransferService::with_options(Arc::clone(&ledger), options);
        Self { ledger, transfers }
    }

    pub fn generate_wallet(&self) -> GeneratedWallet {
        generate_wallet()
    }

    pub async fn get_balance(&self, address: &str) -> Result<Balance, WalletError> {
        let address: Address = address.parse()?;
        with_timeout(self.options().timeout, self.ledger.get_balance(&address)).await
    }

    /// Decode the sender key and recipient, then run the transfer.
    pub async fn send_transfer(
        &self,
        private_key: &EncodedPrivateKey,
        recipient: &str,
        amount: f64,
    ) -> TransferResult {
        let sender = decode(private_key).map_err(WalletError::from)?;
        let recipient = recipient
            .parse::<Address>()
            .map_err(WalletError::from)?;
        self.transfers
            .send(TransferRequest::new(sender, recipient, amount))
            .await
    }

    /// Look up a submitted transaction, `None` if the ledger has not seen it.
    pub async fn transaction_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, WalletError> {
        with_timeout(
            self.options().timeout,
            self.ledger.get_signature_status(signature),
        )
        .await
    }

    fn options(&self) -> &TransferOptions {
        self.transfers.options()
    }
}
