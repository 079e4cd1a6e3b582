use super::{
    api::{ArticleApi, ReaderCredentials},
    wallet::{PaymentRequest, Wallet},
};
use crate::{
    types::{ArticleResponse, ClientError},
    utils::AGREEMENT_TEXT,
};
use ethers::types::{Address, Bytes, H256, U256};
use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};
use tracing::{error, info, warn};

/// 0.00001 ETH.
pub const DEFAULT_PRICE_WEI: u64 = 10_000_000_000_000;

/// Extra wait after confirmation so the explorer has indexed the payment.
pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(15);

pub const MISSING_FULL_POST: &str =
    "Oops, we have confirmed your payment but don't have the full contents!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    Disconnected,
    Connected,
    Signing,
    AwaitingConfirmation,
    Paid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The service already had a matching payment; nothing was sent.
    AlreadyPaid,
    /// Paid and the full article came back.
    Unlocked { tx_hash: H256 },
    /// Paid and confirmed, but the service has not seen the payment yet.
    Pending { tx_hash: H256 },
}

#[derive(Clone, Debug)]
pub struct ReaderConfig {
    pub payment_address: Address,
    pub price: U256,
    pub confirmation_delay: Duration,
}

impl ReaderConfig {
    pub fn new(payment_address: Address) -> Self {
        Self {
            payment_address,
            price: U256::from(DEFAULT_PRICE_WEI),
            confirmation_delay: DEFAULT_CONFIRMATION_DELAY,
        }
    }
}

/// Marks a session as processing a payment for as long as it is alive.
/// Dropping it, including when the `pay` future is cancelled, clears the
/// flag and puts an unpaid session back to `Connected`.
struct PaymentInFlight<'a, W: Wallet> {
    session: &'a mut ReaderSession<W>,
}

impl<'a, W: Wallet> PaymentInFlight<'a, W> {
    fn start(session: &'a mut ReaderSession<W>) -> Self {
        session.payment_processing = true;
        Self { session }
    }
}

impl<W: Wallet> Deref for PaymentInFlight<'_, W> {
    type Target = ReaderSession<W>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<W: Wallet> DerefMut for PaymentInFlight<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<W: Wallet> Drop for PaymentInFlight<'_, W> {
    fn drop(&mut self) {
        self.session.payment_processing = false;
        if self.session.state != ReaderState::Paid {
            self.session.state = ReaderState::Connected;
        }
    }
}

/// One reader's in-memory view of the article and their payment progress.
pub struct ReaderSession<W: Wallet> {
    api: ArticleApi,
    wallet: W,
    config: ReaderConfig,
    state: ReaderState,
    selected_address: Option<String>,
    credentials: Option<ReaderCredentials>,
    is_paid: bool,
    payment_processing: bool,
    article: Option<ArticleResponse>,
}

impl<W: Wallet> ReaderSession<W> {
    pub fn new(api: ArticleApi, wallet: W, config: ReaderConfig) -> Self {
        Self {
            api,
            wallet,
            config,
            state: ReaderState::Disconnected,
            selected_address: None,
            credentials: None,
            is_paid: false,
            payment_processing: false,
            article: None,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn is_processing(&self) -> bool {
        self.payment_processing
    }

    pub fn selected_address(&self) -> Option<&str> {
        self.selected_address.as_deref()
    }

    pub fn article(&self) -> Option<&ArticleResponse> {
        self.article.as_ref()
    }

    /// "Preview: <title>" until the reader has paid.
    pub fn page_title(&self) -> Option<String> {
        self.article.as_ref().map(|article| {
            if self.is_paid {
                article.title.clone()
            } else {
                format!("Preview: {}", article.title)
            }
        })
    }

    /// The HTML to render: the full post once paid, otherwise the preview.
    pub fn content(&self) -> Option<&str> {
        let article = self.article.as_ref()?;
        if !self.is_paid {
            return Some(&article.preview);
        }
        match article.full_post.as_deref() {
            Some(full) if !full.is_empty() => Some(full),
            _ => Some(MISSING_FULL_POST),
        }
    }

    /// Fetches the preview. Never sends credentials.
    pub async fn load(&mut self) -> Result<&ArticleResponse, ClientError> {
        let article = self.api.fetch_article(None).await?;
        Ok(self.article.insert(article))
    }

    /// Requests account access. Returns the selected address, if any.
    pub async fn connect(&mut self) -> Result<Option<String>, ClientError> {
        let accounts = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!("Wallet connection rejected: {}", e);
                return Err(e.into());
            }
        };

        info!("Received accounts: {:?}", accounts);
        self.select_account(accounts.first());
        Ok(self.selected_address.clone())
    }

    /// Signs the agreement, obtains the payment hash, and pays unless the
    /// service already knows about a payment. On failure, or if the returned
    /// future is dropped early, the session goes back to `Connected`.
    pub async fn pay(&mut self) -> Result<PaymentOutcome, ClientError> {
        let address = self.selected_address.clone().ok_or(ClientError::NotConnected)?;

        let mut payment = PaymentInFlight::start(self);
        let result = payment.run_payment(&address).await;
        drop(payment);

        match &result {
            Ok(outcome) => info!("Payment flow finished: {:?}", outcome),
            Err(e) => error!("Payment error: {}", e),
        }

        result
    }

    async fn run_payment(&mut self, address: &str) -> Result<PaymentOutcome, ClientError> {
        self.state = ReaderState::Signing;
        let credentials = self.sign_agreement(address).await?;

        info!("Requesting payment hash for {}", address);
        let hash = self.api.request_hash(&credentials).await?;

        // Covers readers who paid in an earlier session
        if self.refresh(&credentials).await? {
            return Ok(PaymentOutcome::AlreadyPaid);
        }

        let data = hex::decode(hash.trim_start_matches("0x"))
            .map(Bytes::from)
            .map_err(|_| ClientError::MalformedHash(hash.clone()))?;

        let payment = PaymentRequest {
            to: self.config.payment_address,
            value: self.config.price,
            data,
        };

        info!("Sending {} wei to {:?}", payment.value, payment.to);
        let tx_hash = self.wallet.send_payment(&payment).await?;
        self.state = ReaderState::AwaitingConfirmation;

        self.wallet.wait_for_confirmation(tx_hash).await?;
        tokio::time::sleep(self.config.confirmation_delay).await;

        if self.refresh(&credentials).await? {
            Ok(PaymentOutcome::Unlocked { tx_hash })
        } else {
            warn!("Transaction {:?} confirmed but the article is still locked", tx_hash);
            self.state = ReaderState::Connected;
            Ok(PaymentOutcome::Pending { tx_hash })
        }
    }

    /// Re-checks payment with the current credentials, if any were signed.
    pub async fn check_payment(&mut self) -> Result<bool, ClientError> {
        match self.credentials.clone() {
            Some(credentials) => self.refresh(&credentials).await,
            None => Ok(self.is_paid),
        }
    }

    async fn sign_agreement(&mut self, address: &str) -> Result<ReaderCredentials, ClientError> {
        if let Some(credentials) = &self.credentials {
            if credentials.address == address {
                return Ok(credentials.clone());
            }
        }

        let signature = self.wallet.sign_message(AGREEMENT_TEXT).await?;
        let credentials = ReaderCredentials {
            address: address.to_string(),
            signature: format!("0x{}", hex::encode(signature.to_vec())),
        };
        self.credentials = Some(credentials.clone());
        Ok(credentials)
    }

    async fn refresh(&mut self, credentials: &ReaderCredentials) -> Result<bool, ClientError> {
        let article = self.api.fetch_article(Some(credentials)).await?;
        let unlocked = article.is_unlocked();
        self.article = Some(article);
        self.is_paid = unlocked;
        if unlocked {
            self.state = ReaderState::Paid;
        }
        Ok(unlocked)
    }

    /// Any account change forgets payment and signature; an empty list
    /// disconnects.
    pub fn on_accounts_changed(&mut self, accounts: &[Address]) {
        info!("Accounts changed: {:?}", accounts);
        self.select_account(accounts.first());
    }

    /// Starts over as if the page had been reloaded.
    pub async fn on_chain_changed(&mut self) -> Result<(), ClientError> {
        info!("Chain changed, reloading");
        self.state = ReaderState::Disconnected;
        self.selected_address = None;
        self.credentials = None;
        self.is_paid = false;
        self.payment_processing = false;
        self.article = None;
        self.load().await.map(|_| ())
    }

    fn select_account(&mut self, account: Option<&Address>) {
        self.is_paid = false;
        self.credentials = None;
        if let Some(article) = &mut self.article {
            article.full_post = None;
        }

        match account {
            Some(account) => {
                self.selected_address = Some(format!("{:?}", account));
                self.state = ReaderState::Connected;
            }
            None => {
                self.selected_address = None;
                self.state = ReaderState::Disconnected;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content,
        create_router,
        state::AppState,
        test_support::{create_test_wallet, paid_tx, payment_address, StubExplorer},
        types::WalletError,
        utils::payment_hash,
    };
    use async_trait::async_trait;
    use ethers::{
        signers::{LocalWallet, Signer},
        types::Signature,
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    /// Wallet double: signs with a real key and "mines" payments by adding
    /// them to the explorer stub once confirmed.
    #[derive(Clone)]
    struct MockWallet {
        signer: LocalWallet,
        explorer: StubExplorer,
        reject_accounts: bool,
        no_accounts: bool,
        reject_payment: bool,
        index_payments: bool,
        sent: Arc<Mutex<Vec<PaymentRequest>>>,
        confirmations: Arc<AtomicUsize>,
    }

    impl MockWallet {
        fn new(explorer: StubExplorer) -> Self {
            Self {
                signer: create_test_wallet(),
                explorer,
                reject_accounts: false,
                no_accounts: false,
                reject_payment: false,
                index_payments: true,
                sent: Arc::new(Mutex::new(Vec::new())),
                confirmations: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn sent(&self) -> Vec<PaymentRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Wallet for MockWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
            if self.reject_accounts {
                return Err(WalletError::Rejected("User rejected the request.".into()));
            }
            if self.no_accounts {
                return Ok(Vec::new());
            }
            Ok(vec![self.signer.address()])
        }

        async fn sign_message(&self, message: &str) -> Result<Signature, WalletError> {
            self.signer
                .sign_message(message)
                .await
                .map_err(|e| WalletError::Rejected(e.to_string()))
        }

        async fn send_payment(&self, payment: &PaymentRequest) -> Result<H256, WalletError> {
            if self.reject_payment {
                return Err(WalletError::Rejected("User denied transaction signature.".into()));
            }
            self.sent.lock().unwrap().push(payment.clone());
            Ok(H256::random())
        }

        async fn wait_for_confirmation(&self, _tx_hash: H256) -> Result<(), WalletError> {
            self.confirmations.fetch_add(1, Ordering::SeqCst);
            if self.index_payments {
                if let Some(payment) = self.sent().last() {
                    let input = format!("0x{}", hex::encode(&payment.data));
                    self.explorer
                        .push(paid_tx(&format!("{:?}", self.signer.address()), &input));
                }
            }
            Ok(())
        }
    }

    async fn spawn_service(explorer: StubExplorer) -> ArticleApi {
        let state = AppState::new(content::article(1182), payment_address(), explorer);
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ArticleApi::new(&format!("http://{}", addr))
    }

    fn config() -> ReaderConfig {
        ReaderConfig {
            confirmation_delay: Duration::ZERO,
            ..ReaderConfig::new(payment_address())
        }
    }

    #[tokio::test]
    async fn test_full_payment_flow() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let wallet = MockWallet::new(explorer);
        let mut session = ReaderSession::new(api, wallet.clone(), config());

        let article = session.load().await.unwrap();
        assert!(article.full_post.is_none());
        assert_eq!(session.state(), ReaderState::Disconnected);
        assert!(session.page_title().unwrap().starts_with("Preview: "));
        assert_eq!(session.content(), Some(content::article(1182).preview_html.as_str()));

        let address = session.connect().await.unwrap().unwrap();
        assert_eq!(address, format!("{:?}", wallet.signer.address()));
        assert_eq!(session.state(), ReaderState::Connected);

        let outcome = session.pay().await.unwrap();
        assert!(matches!(outcome, PaymentOutcome::Unlocked { .. }));
        assert_eq!(session.state(), ReaderState::Paid);
        assert!(session.is_paid());
        assert!(!session.is_processing());
        assert_eq!(session.content(), Some(content::article(1182).full_html.as_str()));
        assert_eq!(session.page_title().unwrap(), content::article(1182).title);

        let sent = wallet.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, payment_address());
        assert_eq!(sent[0].value, U256::from(DEFAULT_PRICE_WEI));
        assert_eq!(
            format!("0x{}", hex::encode(&sent[0].data)),
            payment_hash(1182, &address)
        );
    }

    #[tokio::test]
    async fn test_already_paid_reader_is_not_charged_twice() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let wallet = MockWallet::new(explorer.clone());
        let address = format!("{:?}", wallet.signer.address());
        explorer.push(paid_tx(&address, &payment_hash(1182, &address)));

        let mut session = ReaderSession::new(api, wallet.clone(), config());
        session.load().await.unwrap();
        session.connect().await.unwrap();

        assert_eq!(session.pay().await.unwrap(), PaymentOutcome::AlreadyPaid);
        assert_eq!(session.state(), ReaderState::Paid);
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unindexed_payment_stays_pending() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let mut wallet = MockWallet::new(explorer);
        wallet.index_payments = false;

        let mut session = ReaderSession::new(api, wallet.clone(), config());
        session.load().await.unwrap();
        session.connect().await.unwrap();

        let outcome = session.pay().await.unwrap();
        assert!(matches!(outcome, PaymentOutcome::Pending { .. }));
        assert_eq!(session.state(), ReaderState::Connected);
        assert!(!session.is_paid());
        assert_eq!(wallet.confirmations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explorer_outage_keeps_preview() {
        let explorer = StubExplorer::default();
        explorer.set_failing(true);
        let api = spawn_service(explorer.clone()).await;
        let wallet = MockWallet::new(explorer);

        let mut session = ReaderSession::new(api, wallet, config());
        session.load().await.unwrap();
        session.connect().await.unwrap();

        assert!(matches!(
            session.pay().await.unwrap(),
            PaymentOutcome::Pending { .. }
        ));
        assert!(session.article().unwrap().full_post.is_none());
    }

    #[tokio::test]
    async fn test_rejected_connection_stays_disconnected() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let mut wallet = MockWallet::new(explorer);
        wallet.reject_accounts = true;

        let mut session = ReaderSession::new(api, wallet, config());
        session.load().await.unwrap();

        assert!(matches!(
            session.connect().await,
            Err(ClientError::Wallet(WalletError::Rejected(_)))
        ));
        assert_eq!(session.state(), ReaderState::Disconnected);
        assert!(matches!(session.pay().await, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_wallet_without_accounts_stays_disconnected() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let mut wallet = MockWallet::new(explorer);
        wallet.no_accounts = true;

        let mut session = ReaderSession::new(api, wallet, config());
        session.load().await.unwrap();

        assert_eq!(session.connect().await.unwrap(), None);
        assert_eq!(session.state(), ReaderState::Disconnected);
        assert_eq!(session.selected_address(), None);
        assert!(matches!(session.pay().await, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_cancelled_payment_can_be_retried() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let wallet = MockWallet::new(explorer);

        let slow = ReaderConfig {
            confirmation_delay: Duration::from_secs(60),
            ..ReaderConfig::new(payment_address())
        };
        let mut session = ReaderSession::new(api, wallet.clone(), slow);
        session.load().await.unwrap();
        session.connect().await.unwrap();

        // Gives up while waiting out the indexing delay
        let first = tokio::time::timeout(Duration::from_millis(500), session.pay()).await;
        assert!(first.is_err());
        assert_eq!(session.state(), ReaderState::Connected);
        assert!(!session.is_processing());
        assert!(!session.is_paid());

        // The payment went out before the timeout, so the retry finds it
        session.config.confirmation_delay = Duration::ZERO;
        assert_eq!(session.pay().await.unwrap(), PaymentOutcome::AlreadyPaid);
        assert_eq!(session.state(), ReaderState::Paid);
        assert_eq!(wallet.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_payment_returns_to_connected() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let mut wallet = MockWallet::new(explorer);
        wallet.reject_payment = true;

        let mut session = ReaderSession::new(api, wallet, config());
        session.load().await.unwrap();
        session.connect().await.unwrap();

        assert!(matches!(
            session.pay().await,
            Err(ClientError::Wallet(WalletError::Rejected(_)))
        ));
        assert_eq!(session.state(), ReaderState::Connected);
        assert!(!session.is_paid());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_account_and_chain_changes_reset_payment() {
        let explorer = StubExplorer::default();
        let api = spawn_service(explorer.clone()).await;
        let wallet = MockWallet::new(explorer);

        let mut session = ReaderSession::new(api, wallet, config());
        session.load().await.unwrap();
        session.connect().await.unwrap();
        session.pay().await.unwrap();
        assert!(session.is_paid());

        let other = Address::random();
        session.on_accounts_changed(&[other]);
        assert!(!session.is_paid());
        assert_eq!(session.state(), ReaderState::Connected);
        assert_eq!(session.selected_address(), Some(format!("{:?}", other).as_str()));
        assert!(session.article().unwrap().full_post.is_none());

        session.on_accounts_changed(&[]);
        assert_eq!(session.state(), ReaderState::Disconnected);
        assert_eq!(session.selected_address(), None);

        session.connect().await.unwrap();
        assert!(session.check_payment().await.is_ok());
        session.on_chain_changed().await.unwrap();
        assert_eq!(session.state(), ReaderState::Disconnected);
        assert!(session.article().is_some());
        assert!(!session.is_paid());
    }

    #[test]
    fn test_paid_without_full_body_shows_fallback() {
        let api = ArticleApi::new("http://127.0.0.1:1");
        let mut session = ReaderSession::new(api, MockWallet::new(StubExplorer::default()), config());
        let mut article = ArticleResponse::full(&content::article(1182));
        article.full_post = Some(String::new());
        session.article = Some(article);
        session.is_paid = true;

        assert_eq!(session.content(), Some(MISSING_FULL_POST));
    }
}
