//! Cross-crate tests for the transfer pipeline:
//! decode key -> check balance -> fetch blockhash -> sign -> submit.
//!
//! A scripted in-memory ledger stands in for the node, so every scenario
//! runs offline and records exactly which calls were made.

use std::future::ready;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use chain_sol::{verify_transaction, Blockhash, LAMPORTS_PER_SOL};
use sol_rpc::{LatestBlockhash, LedgerError};
use wallet_core::*;

// ─── Scripted ledger ────────────────────────────────────────────────

struct MockLedger {
    balance: u64,
    submit_result: Result<String, LedgerError>,
    balance_error: Option<LedgerError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<&'static str>>,
    submitted: Mutex<Vec<Vec<u8>>>,
    status: Option<SignatureStatus>,
}

impl MockLedger {
    fn with_balance(balance: u64) -> Self {
        Self {
            balance,
            submit_result: Ok("abc123".into()),
            balance_error: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            status: None,
        }
    }

    fn sol(amount: u64) -> Self {
        Self::with_balance(amount * LAMPORTS_PER_SOL)
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().unwrap().clone()
    }

    async fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, _address: &Address) -> Result<Balance, LedgerError> {
        self.record("get_balance").await;
        match &self.balance_error {
            Some(err) => Err(err.clone()),
            None => Ok(Balance::from_lamports(self.balance)),
        }
    }

    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, LedgerError> {
        self.record("get_latest_blockhash").await;
        Ok(LatestBlockhash {
            blockhash: Blockhash::new([0x42; 32]),
            last_valid_block_height: 1_000,
        })
    }

    async fn submit_transaction(&self, signed_tx: &[u8]) -> Result<String, LedgerError> {
        self.record("submit_transaction").await;
        self.submitted.lock().unwrap().push(signed_tx.to_vec());
        self.submit_result.clone()
    }

    async fn get_signature_status(
        &self,
        _signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        self.record("get_signature_status").await;
        Ok(self.status.clone())
    }
}

fn client(ledger: &Arc<MockLedger>) -> WalletClient {
    WalletClient::with_ledger(ledger.clone())
}

fn transfer_data(lamports: u64) -> Vec<u8> {
    let mut data = 2u32.to_le_bytes().to_vec();
    data.extend_from_slice(&lamports.to_le_bytes());
    data
}

// ─── Wallet generation and balance ──────────────────────────────────

#[tokio::test]
async fn fresh_wallet_has_zero_balance() {
    let ledger = Arc::new(MockLedger::with_balance(0));
    let wallet = client(&ledger);

    let generated = wallet.generate_wallet();
    let balance = wallet
        .get_balance(&generated.address.to_string())
        .await
        .unwrap();

    assert_eq!(balance, Balance::ZERO);
    assert_eq!(ledger.calls(), vec!["get_balance"]);
}

#[tokio::test]
async fn balance_of_bad_address_is_rejected_locally() {
    let ledger = Arc::new(MockLedger::with_balance(0));
    let err = client(&ledger).get_balance("not-an-address").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AddressParse);
    assert!(ledger.calls().is_empty());
}

// ─── Successful transfer ────────────────────────────────────────────

#[tokio::test]
async fn transfer_submits_signed_transaction() {
    let ledger = Arc::new(MockLedger::sol(5));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address;

    let receipt = wallet
        .send_transfer(&sender.private_key, &recipient.to_string(), 2.0)
        .await
        .unwrap();

    assert_eq!(receipt.signature, "abc123");
    assert_eq!(receipt.lamports, 2 * LAMPORTS_PER_SOL);
    assert_eq!(receipt.recipient, recipient);
    assert_eq!(
        ledger.calls(),
        vec!["get_balance", "get_latest_blockhash", "submit_transaction"]
    );

    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 1);
    let wire = &submitted[0];
    verify_transaction(wire).unwrap();
    assert!(wire
        .windows(12)
        .any(|w| w == transfer_data(2 * LAMPORTS_PER_SOL).as_slice()));
    assert!(wire.windows(32).any(|w| w == sender.address.as_bytes()));
    assert!(wire.windows(32).any(|w| w == recipient.as_bytes()));
}

#[tokio::test]
async fn legacy_messages_can_be_selected() {
    let ledger = Arc::new(MockLedger::sol(5));
    let options = TransferOptions {
        message_version: MessageVersion::Legacy,
        ..TransferOptions::default()
    };
    let wallet = WalletClient::with_options(ledger.clone(), options);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address;

    wallet
        .send_transfer(&sender.private_key, &recipient.to_string(), 1.0)
        .await
        .unwrap();

    let wire = &ledger.submitted()[0];
    verify_transaction(wire).unwrap();
    // One signature: compact length 1, 64 signature bytes, then the header.
    assert_eq!(wire[65], 1, "legacy header starts with the signer count");
}

#[tokio::test]
async fn spending_the_whole_balance_is_allowed() {
    let ledger = Arc::new(MockLedger::sol(1));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let receipt = wallet
        .send_transfer(&sender.private_key, &recipient, 1.0)
        .await
        .unwrap();
    assert_eq!(receipt.lamports, LAMPORTS_PER_SOL);
}

// ─── Rejections ─────────────────────────────────────────────────────

#[tokio::test]
async fn rejected_submission_reports_pending_signature() {
    let mut mock = MockLedger::sol(5);
    mock.submit_result = Err(LedgerError::Rpc {
        code: -32002,
        message: "blockhash expired".into(),
    });
    let ledger = Arc::new(mock);
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let failure = wallet
        .send_transfer(&sender.private_key, &recipient, 2.0)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Rpc);
    assert!(failure.message().contains("blockhash expired"));
    assert!(failure.pending_signature.is_some());
    assert!(!failure.is_retry_safe());
}

#[tokio::test]
async fn non_positive_amounts_make_no_calls() {
    let ledger = Arc::new(MockLedger::sol(5));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let failure = wallet
            .send_transfer(&sender.private_key, &recipient, amount)
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::InvalidAmount, "amount {amount}");
        assert!(failure.pending_signature.is_none());
    }
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn sub_lamport_amount_is_a_precision_error() {
    let ledger = Arc::new(MockLedger::sol(5));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let failure = wallet
        .send_transfer(&sender.private_key, &recipient, 0.0000000005)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::AmountPrecision);
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn insufficient_funds_stops_after_balance() {
    let ledger = Arc::new(MockLedger::sol(1));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let failure = wallet
        .send_transfer(&sender.private_key, &recipient, 2.0)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(
        failure.error,
        WalletError::InsufficientFunds {
            balance: Balance::from_lamports(LAMPORTS_PER_SOL),
            requested: Balance::from_lamports(2 * LAMPORTS_PER_SOL),
        }
    );
    assert!(!failure.is_retry_safe());
    assert_eq!(ledger.calls(), vec!["get_balance"]);
}

#[tokio::test]
async fn bad_key_and_recipient_are_rejected_locally() {
    let ledger = Arc::new(MockLedger::sol(5));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let failure = wallet
        .send_transfer(&EncodedPrivateKey::new("garbage!"), &recipient, 1.0)
        .await
        .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::InvalidKey);

    let failure = wallet
        .send_transfer(&sender.private_key, "0OIl", 1.0)
        .await
        .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::AddressParse);

    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn local_rejections_carry_a_single_prefix() {
    let ledger = Arc::new(MockLedger::sol(5));
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    // "11" decodes to two zero bytes.
    let failure = wallet
        .send_transfer(&EncodedPrivateKey::new("11"), &recipient, 1.0)
        .await
        .unwrap_err();
    assert_eq!(
        failure.message(),
        "Invalid private key: expected 64 bytes, got 2"
    );

    let failure = wallet
        .send_transfer(&sender.private_key, "1", 1.0)
        .await
        .unwrap_err();
    assert_eq!(
        failure.message(),
        "Invalid address: expected 32 bytes, got 1"
    );
}

// ─── Network failures ───────────────────────────────────────────────

#[tokio::test]
async fn network_failure_before_submission_is_retry_safe() {
    let mut mock = MockLedger::sol(5);
    mock.balance_error = Some(LedgerError::Transport("connection refused".into()));
    let ledger = Arc::new(mock);
    let wallet = client(&ledger);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let failure = wallet
        .send_transfer(&sender.private_key, &recipient, 1.0)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Network);
    assert!(failure.is_retry_safe());
    assert_eq!(ledger.calls(), vec!["get_balance"]);
}

#[tokio::test]
async fn slow_ledger_times_out() {
    let mut mock = MockLedger::sol(5);
    mock.delay = Some(Duration::from_secs(5));
    let ledger = Arc::new(mock);
    let options = TransferOptions {
        timeout: Some(Duration::from_millis(50)),
        ..TransferOptions::default()
    };
    let wallet = WalletClient::with_options(ledger.clone(), options);
    let sender = wallet.generate_wallet();
    let recipient = wallet.generate_wallet().address.to_string();

    let failure = wallet
        .send_transfer(&sender.private_key, &recipient, 1.0)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Timeout);
    assert!(failure.is_retry_safe());
    assert_eq!(ledger.calls(), vec!["get_balance"]);
}

// ─── Cancellation ───────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_transfer_never_submits() {
    let ledger = Arc::new(MockLedger::sol(5));
    let service = TransferService::new(ledger.clone());
    let sender = chain_sol::generate();
    let recipient = generate_wallet().address;

    let failure = service
        .send_with_cancel(TransferRequest::new(sender, recipient, 1.0), ready(()))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Cancelled);
    assert!(failure.pending_signature.is_none());
    assert!(!ledger.calls().contains(&"submit_transaction"));
}

#[tokio::test]
async fn cancel_during_blockhash_fetch() {
    let mut mock = MockLedger::sol(5);
    mock.delay = Some(Duration::from_millis(100));
    let ledger = Arc::new(mock);
    let service = TransferService::new(ledger.clone());
    let sender = chain_sol::generate();
    let recipient = generate_wallet().address;

    let cancel = tokio::time::sleep(Duration::from_millis(150));
    let failure = service
        .send_with_cancel(TransferRequest::new(sender, recipient, 1.0), cancel)
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Cancelled);
    assert_eq!(ledger.calls(), vec!["get_balance", "get_latest_blockhash"]);
}

// ─── Concurrency ────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_share_one_service() {
    let ledger = Arc::new(MockLedger::sol(100));
    let wallet = Arc::new(client(&ledger));

    let mut handles = Vec::new();
    for i in 1..=8u32 {
        let wallet = wallet.clone();
        handles.push(tokio::spawn(async move {
            let sender = wallet.generate_wallet();
            let recipient = wallet.generate_wallet().address.to_string();
            wallet
                .send_transfer(&sender.private_key, &recipient, f64::from(i))
                .await
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap().unwrap().lamports;
    }

    assert_eq!(total, 36 * LAMPORTS_PER_SOL);
    assert_eq!(ledger.submitted().len(), 8);
    for wire in ledger.submitted() {
        verify_transaction(&wire).unwrap();
    }
}

// ─── Status lookup ──────────────────────────────────────────────────

#[tokio::test]
async fn transaction_status_passes_through() {
    let mut mock = MockLedger::sol(0);
    mock.status = Some(SignatureStatus {
        slot: 72,
        confirmations: None,
        err: None,
        confirmation_status: Some(Commitment::Finalized),
    });
    let ledger = Arc::new(mock);

    let status = client(&ledger)
        .transaction_status("abc123")
        .await
        .unwrap()
        .unwrap();

    assert!(status.is_success());
    assert!(status.is_finalized());
    assert_eq!(ledger.calls(), vec!["get_signature_status"]);
}
