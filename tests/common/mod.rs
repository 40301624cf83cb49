//! Shared test fixtures: a programmable in-memory ledger and a
//! programmable HTTP backend for driving the real gateway client.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use matebot::gateway::types::{
    AccountId, AccountSnapshot, CatalogItem, DrinkId, GatewayError, GatewayResult, Money,
};
use matebot::gateway::Ledger;

/// Start a programmable HTTP/1.1 backend on an ephemeral port. The
/// handler runs once per request and yields the status and JSON body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut seen = Vec::new();
                        let mut buf = [0u8; 4096];
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    seen.extend_from_slice(&buf[..n]);
                                    if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                            }
                        }
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

#[derive(Default)]
struct MockState {
    accounts: Mutex<Vec<AccountSnapshot>>,
    catalog: Mutex<Vec<CatalogItem>>,
    charges: Mutex<Vec<(AccountId, DrinkId)>>,
    unreachable: AtomicBool,
}

/// Ledger double that records every charge call and applies it to the
/// held balances, so a post-charge `accounts` fetch observes the new
/// balance the way the real service would.
#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, id: u32, name: &str, balance_cents: i64) -> Self {
        self.state.lock_accounts().push(AccountSnapshot {
            id: AccountId(id),
            name: name.to_string(),
            balance: Money(balance_cents),
        });
        self
    }

    pub fn with_drink(self, id: u32, name: &str, price_cents: i64, active: bool) -> Self {
        self.state.lock_catalog().push(CatalogItem {
            id: DrinkId(id),
            name: name.to_string(),
            price: Money(price_cents),
            active,
        });
        self
    }

    /// Make every call fail until reset, simulating a gateway outage.
    pub fn set_unreachable(&self, on: bool) {
        self.state.unreachable.store(on, Ordering::SeqCst);
    }

    pub fn charges(&self) -> Vec<(AccountId, DrinkId)> {
        self.state.charges.lock().unwrap().clone()
    }

    pub fn balance_of(&self, id: u32) -> Option<Money> {
        self.state
            .lock_accounts()
            .iter()
            .find(|a| a.id == AccountId(id))
            .map(|a| a.balance)
    }

    fn check_reachable(&self) -> GatewayResult<()> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            Err(GatewayError::Request("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl MockState {
    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, Vec<AccountSnapshot>> {
        self.accounts.lock().unwrap()
    }

    fn lock_catalog(&self) -> std::sync::MutexGuard<'_, Vec<CatalogItem>> {
        self.catalog.lock().unwrap()
    }
}

impl Ledger for MockLedger {
    async fn accounts(&self) -> GatewayResult<Vec<AccountSnapshot>> {
        self.check_reachable()?;
        Ok(self.state.lock_accounts().clone())
    }

    async fn catalog(&self) -> GatewayResult<Vec<CatalogItem>> {
        self.check_reachable()?;
        Ok(self.state.lock_catalog().clone())
    }

    async fn purchase(&self, account: AccountId, drink: DrinkId) -> GatewayResult<()> {
        self.check_reachable()?;
        self.state.charges.lock().unwrap().push((account, drink));
        let price = self
            .state
            .lock_catalog()
            .iter()
            .find(|i| i.id == drink)
            .map(|i| i.price);
        if let Some(Money(price)) = price {
            let mut accounts = self.state.lock_accounts();
            if let Some(snapshot) = accounts.iter_mut().find(|a| a.id == account) {
                snapshot.balance = Money(snapshot.balance.0 - price);
            }
        }
        Ok(())
    }
}
