//! In-memory [`Ledger`] that simulates the marketplace and activity contracts.
//!
//! [`ScriptedLedger`] executes submitted calls against a small model of the
//! contracts: it mints, lists, lends and liquidates, emits the same logs the
//! real contracts do, and reverts with a reason when a rule is broken.
//! On top of the model, tests can script:
//!
//! - log reads (`script_log_reads`) for polling scenarios,
//! - held receipts (`hold_receipts`) for confirmation timeouts,
//! - submission rejections (`reject_next_submission`),
//! - the activity computation result and whether it lands in the receipt.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use alloy_primitives::{keccak256, Address, Bytes, I256, U256};
use alloy_sol_types::{SolEvent, SolInterface, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::contract::activity::IActivityRequest::{self, IActivityRequestCalls};
use crate::contract::marketplace::IMarketplace::{self, IMarketplaceCalls};
use crate::domain::activity::ActivityPoints;
use crate::domain::loan::SECONDS_PER_DAY;
use crate::domain::money::{ExchangeRate, Money};
use crate::domain::receipt::{LogEntry, Receipt, ReceiptStatus, TransactionHandle};
use crate::error::LedgerError;
use crate::port::outbound::ledger::{Ledger, LedgerCall, LedgerResult};

use super::fixture;

/// Interest charged on funded loans, in percent per year.
pub const ANNUAL_INTEREST_PERCENT: u64 = 10;

/// Scripted answer to one `get_logs` call.
#[derive(Debug, Clone)]
pub enum LogRead {
    Logs(Vec<LogEntry>),
    Error(String),
}

#[derive(Debug, Clone)]
struct SaleRecord {
    seller: Address,
    price_usd: U256,
    active: bool,
}

#[derive(Debug, Clone, Default)]
struct LoanRecord {
    principal_usd: U256,
    principal_native: U256,
    interest_native: U256,
    duration_days: U256,
    deadline: U256,
    borrower: Address,
    lender: Address,
    start_time: U256,
    active: bool,
}

impl LoanRecord {
    fn is_funded(&self) -> bool {
        !self.lender.is_zero()
    }
}

struct State {
    sender: Option<Address>,
    block: u64,
    timestamp: u64,
    price_answer: I256,
    next_token: u64,
    owners: BTreeMap<U256, Address>,
    uris: BTreeMap<U256, String>,
    activity_points: HashMap<Address, U256>,
    sales: BTreeMap<U256, SaleRecord>,
    loans: BTreeMap<U256, LoanRecord>,
    receipts: HashMap<TransactionHandle, Receipt>,
    held: HashSet<TransactionHandle>,
    hold_receipts: bool,
    history: Vec<LogEntry>,
    log_reads: VecDeque<LogRead>,
    log_ranges: Vec<(u64, u64)>,
    reject_next: Option<LedgerError>,
    submissions: Vec<LedgerCall>,
    activity_result: Option<ActivityPoints>,
    activity_in_receipt: bool,
    nonce: u64,
}

/// In-memory marketplace and activity contracts behind the [`Ledger`] port.
pub struct ScriptedLedger {
    marketplace: Address,
    activity: Address,
    state: Mutex<State>,
    receipt_polls: AtomicU32,
    log_reads: AtomicU32,
}

impl ScriptedLedger {
    /// A ledger at block 1 with a 3000 USD/ETH feed, signing as
    /// [`fixture::ALICE`].
    pub fn new() -> Self {
        Self {
            marketplace: fixture::MARKETPLACE,
            activity: fixture::ACTIVITY,
            state: Mutex::new(State {
                sender: Some(fixture::ALICE),
                block: 1,
                timestamp: fixture::GENESIS_TIME,
                price_answer: I256::from_raw(U256::from(3_000u64) * U256::from(100_000_000u64)),
                next_token: 1,
                owners: BTreeMap::new(),
                uris: BTreeMap::new(),
                activity_points: HashMap::new(),
                sales: BTreeMap::new(),
                loans: BTreeMap::new(),
                receipts: HashMap::new(),
                held: HashSet::new(),
                hold_receipts: false,
                history: Vec::new(),
                log_reads: VecDeque::new(),
                log_ranges: Vec::new(),
                reject_next: None,
                submissions: Vec::new(),
                activity_result: None,
                activity_in_receipt: false,
                nonce: 0,
            }),
            receipt_polls: AtomicU32::new(0),
            log_reads: AtomicU32::new(0),
        }
    }

    pub const fn marketplace(&self) -> Address {
        self.marketplace
    }

    pub const fn activity(&self) -> Address {
        self.activity
    }

    /// Sign subsequent submissions as `sender`; `None` removes the signer.
    pub fn set_sender(&self, sender: Option<Address>) {
        self.state.lock().sender = sender;
    }

    /// Set the raw 8-decimal feed answer.
    pub fn set_price_answer(&self, answer: I256) {
        self.state.lock().price_answer = answer;
    }

    /// Set the feed to a whole-dollar price per ETH.
    pub fn set_price_usd(&self, dollars: u64) {
        self.set_price_answer(I256::from_raw(
            U256::from(dollars) * U256::from(100_000_000u64),
        ));
    }

    pub fn set_block(&self, block: u64) {
        self.state.lock().block = block;
    }

    pub fn set_timestamp(&self, timestamp: u64) {
        self.state.lock().timestamp = timestamp;
    }

    /// Move ledger time forward.
    pub fn advance_time(&self, secs: u64) {
        let mut state = self.state.lock();
        state.timestamp += secs;
        state.block += 1;
    }

    pub fn timestamp(&self) -> u64 {
        self.state.lock().timestamp
    }

    pub fn block(&self) -> u64 {
        self.state.lock().block
    }

    /// Mint `id` to `owner` directly, without a transaction.
    pub fn seed_token(&self, owner: Address, uri: &str) -> U256 {
        let mut state = self.state.lock();
        let id = U256::from(state.next_token);
        state.next_token += 1;
        state.owners.insert(id, owner);
        state.uris.insert(id, uri.to_string());
        id
    }

    pub fn set_activity_points(&self, user: Address, points: u64) {
        self.state
            .lock()
            .activity_points
            .insert(user, U256::from(points));
    }

    /// Result the activity computation publishes. When `in_receipt` is set
    /// the `ActivityCalculated` log is part of the request receipt.
    pub fn set_activity_result(&self, points: ActivityPoints, in_receipt: bool) {
        let mut state = self.state.lock();
        state.activity_result = Some(points);
        state.activity_in_receipt = in_receipt;
    }

    /// Queue answers for the next `get_logs` calls. Once the queue is empty,
    /// reads fall back to the recorded log history.
    pub fn script_log_reads(&self, reads: Vec<LogRead>) {
        self.state.lock().log_reads.extend(reads);
    }

    /// Append logs to the history served by `get_logs`.
    pub fn push_history(&self, logs: Vec<LogEntry>) {
        self.state.lock().history.extend(logs);
    }

    /// While set, receipts of new submissions stay invisible.
    pub fn hold_receipts(&self, hold: bool) {
        let mut state = self.state.lock();
        state.hold_receipts = hold;
        if !hold {
            state.held.clear();
        }
    }

    /// Fail the next submission with `error` before anything is broadcast.
    pub fn reject_next_submission(&self, error: LedgerError) {
        self.state.lock().reject_next = Some(error);
    }

    /// Every call passed to `submit`, in order.
    pub fn submissions(&self) -> Vec<LedgerCall> {
        self.state.lock().submissions.clone()
    }

    /// Block ranges requested through `get_logs`, in order.
    pub fn log_ranges(&self) -> Vec<(u64, u64)> {
        self.state.lock().log_ranges.clone()
    }

    pub fn log_read_count(&self) -> u32 {
        self.log_reads.load(Ordering::SeqCst)
    }

    pub fn receipt_poll_count(&self) -> u32 {
        self.receipt_polls.load(Ordering::SeqCst)
    }

    pub fn owner_of(&self, id: U256) -> Option<Address> {
        self.state.lock().owners.get(&id).copied()
    }

    fn next_handle(state: &mut State) -> TransactionHandle {
        state.nonce += 1;
        TransactionHandle::new(keccak256(state.nonce.to_be_bytes()))
    }
}

impl Default for ScriptedLedger {
    fn default() -> Self {
        Self::new()
    }
}

type Revert = String;
type Exec = Result<Vec<LogEntry>, Revert>;

fn require(cond: bool, reason: &str) -> Result<(), Revert> {
    if cond {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

impl State {
    fn rate(&self) -> Result<ExchangeRate, Revert> {
        ExchangeRate::from_answer(self.price_answer).map_err(|_| "Invalid price".to_string())
    }

    fn usd_to_native(&self, usd: U256) -> Result<U256, Revert> {
        self.rate()?
            .usd_to_native(Money::usd(usd))
            .map(|m| m.raw())
            .map_err(|e| e.to_string())
    }

    fn native_to_usd(&self, native: U256) -> Result<U256, Revert> {
        self.rate()?
            .native_to_usd(Money::native(native))
            .map(|m| m.raw())
            .map_err(|e| e.to_string())
    }

    fn interest_for(principal: U256, days: U256) -> U256 {
        principal * U256::from(ANNUAL_INTEREST_PERCENT) * days / U256::from(100u64 * 365)
    }

    fn owner(&self, id: U256) -> Result<Address, Revert> {
        self.owners
            .get(&id)
            .copied()
            .ok_or_else(|| "Token does not exist".to_string())
    }

    fn loan(&self, id: U256) -> LoanRecord {
        self.loans.get(&id).cloned().unwrap_or_default()
    }

    fn is_expired(&self, loan: &LoanRecord) -> bool {
        loan.active && loan.is_funded() && U256::from(self.timestamp) > loan.deadline
    }

    fn log<E: SolEvent>(&self, address: Address, event: &E) -> LogEntry {
        let mut entry = fixture::log_entry(address, event);
        entry.block_number = Some(self.block);
        entry
    }

    fn view(&self, marketplace: Address, input: &[u8]) -> Result<Vec<u8>, Revert> {
        let call = IMarketplaceCalls::abi_decode(input).map_err(|e| e.to_string())?;
        let out = match call {
            IMarketplaceCalls::getTokensOfOwner(c) => self
                .owners
                .iter()
                .filter(|(_, o)| **o == c.owner)
                .map(|(id, _)| *id)
                .collect::<Vec<_>>()
                .abi_encode(),
            IMarketplaceCalls::getAllTokens(_) => {
                self.owners.keys().copied().collect::<Vec<_>>().abi_encode()
            }
            IMarketplaceCalls::totalMinted(_) => U256::from(self.owners.len()).abi_encode(),
            IMarketplaceCalls::tokenURI(c) => {
                self.owner(c.tokenId)?;
                self.uris.get(&c.tokenId).cloned().unwrap_or_default().abi_encode()
            }
            IMarketplaceCalls::ownerOf(c) => self.owner(c.tokenId)?.abi_encode(),
            IMarketplaceCalls::balanceOf(c) => {
                U256::from(self.owners.values().filter(|o| **o == c.owner).count()).abi_encode()
            }
            IMarketplaceCalls::name(_) => "Proof of Asset".to_string().abi_encode(),
            IMarketplaceCalls::symbol(_) => "POA".to_string().abi_encode(),
            IMarketplaceCalls::getNftContractAddress(_) => marketplace.abi_encode(),
            IMarketplaceCalls::getLendingContractAddress(_) => marketplace.abi_encode(),
            IMarketplaceCalls::getPriceFeedAddress(_) => fixture::PRICE_FEED.abi_encode(),
            IMarketplaceCalls::getUserActivityPoints(c) => self
                .activity_points
                .get(&c.user)
                .copied()
                .unwrap_or_default()
                .abi_encode(),
            IMarketplaceCalls::getLatestPrice(_) => self.price_answer.abi_encode(),
            IMarketplaceCalls::convertUSDToETH(c) => self.usd_to_native(c.usdAmount)?.abi_encode(),
            IMarketplaceCalls::convertETHToUSD(c) => self.native_to_usd(c.ethAmount)?.abi_encode(),
            IMarketplaceCalls::getSaleInfo(c) => {
                let sale = self.sales.get(&c.tokenId);
                (
                    sale.map(|s| s.seller).unwrap_or_default(),
                    sale.map(|s| s.price_usd).unwrap_or_default(),
                    sale.is_some_and(|s| s.active),
                )
                    .abi_encode_params()
            }
            IMarketplaceCalls::getSaleETHPrice(c) => {
                let sale = self
                    .sales
                    .get(&c.tokenId)
                    .filter(|s| s.active)
                    .ok_or_else(|| "Sale not active".to_string())?;
                (self.usd_to_native(sale.price_usd)?, sale.price_usd).abi_encode_params()
            }
            IMarketplaceCalls::getTokensForSale(_) => self
                .sales
                .iter()
                .filter(|(_, s)| s.active)
                .map(|(id, _)| *id)
                .collect::<Vec<_>>()
                .abi_encode(),
            IMarketplaceCalls::getAllActiveSales(_) => {
                let active: Vec<_> = self.sales.iter().filter(|(_, s)| s.active).collect();
                let mut native = Vec::with_capacity(active.len());
                for (_, s) in &active {
                    native.push(self.usd_to_native(s.price_usd)?);
                }
                (
                    active.iter().map(|(id, _)| **id).collect::<Vec<_>>(),
                    active.iter().map(|(_, s)| s.seller).collect::<Vec<_>>(),
                    active.iter().map(|(_, s)| s.price_usd).collect::<Vec<_>>(),
                    native,
                )
                    .abi_encode_params()
            }
            IMarketplaceCalls::getLoanInfo(c) => {
                let loan = self.loan(c.tokenId);
                let (amount, deadline) = if loan.is_funded() {
                    (loan.principal_native, loan.deadline)
                } else if loan.active {
                    (self.usd_to_native(loan.principal_usd)?, loan.duration_days)
                } else {
                    (U256::ZERO, U256::ZERO)
                };
                (
                    amount,
                    loan.interest_native,
                    deadline,
                    loan.borrower,
                    loan.lender,
                    loan.start_time,
                    loan.active,
                )
                    .abi_encode_params()
            }
            IMarketplaceCalls::getLoanInfoWithUSD(c) => {
                let loan = self.loan(c.tokenId);
                let (amount, deadline) = if loan.is_funded() {
                    (loan.principal_native, loan.deadline)
                } else if loan.active {
                    (self.usd_to_native(loan.principal_usd)?, loan.duration_days)
                } else {
                    (U256::ZERO, U256::ZERO)
                };
                (
                    amount,
                    loan.interest_native,
                    self.native_to_usd(amount)?,
                    self.native_to_usd(loan.interest_native)?,
                    deadline,
                    loan.borrower,
                    loan.lender,
                    loan.start_time,
                    loan.active,
                )
                    .abi_encode_params()
            }
            IMarketplaceCalls::getAllActiveLoans(_) => {
                let active: Vec<_> = self.loans.iter().filter(|(_, l)| l.active).collect();
                let mut amounts = Vec::with_capacity(active.len());
                for (_, l) in &active {
                    amounts.push(if l.is_funded() {
                        l.principal_native
                    } else {
                        self.usd_to_native(l.principal_usd)?
                    });
                }
                (
                    active.iter().map(|(id, _)| **id).collect::<Vec<_>>(),
                    active.iter().map(|(_, l)| l.borrower).collect::<Vec<_>>(),
                    amounts,
                    active
                        .iter()
                        .map(|(_, l)| if l.is_funded() { l.deadline } else { l.duration_days })
                        .collect::<Vec<_>>(),
                    active.iter().map(|(_, l)| l.is_funded()).collect::<Vec<_>>(),
                )
                    .abi_encode_params()
            }
            IMarketplaceCalls::getTokensForLoan(_) => self
                .loans
                .iter()
                .filter(|(_, l)| l.active && !l.is_funded())
                .map(|(id, _)| *id)
                .collect::<Vec<_>>()
                .abi_encode(),
            IMarketplaceCalls::isLoanExpired(c) => self.is_expired(&self.loan(c.tokenId)).abi_encode(),
            IMarketplaceCalls::getLiquidatableTokens(_) => self
                .loans
                .iter()
                .filter(|(_, l)| self.is_expired(l))
                .map(|(id, _)| *id)
                .collect::<Vec<_>>()
                .abi_encode(),
            IMarketplaceCalls::getTotalRepaymentAmount(c) => {
                let loan = self.loan(c.tokenId);
                require(loan.active && loan.is_funded(), "Loan not funded")?;
                (loan.principal_native + loan.interest_native).abi_encode()
            }
            IMarketplaceCalls::getTotalRepaymentAmountWithUSD(c) => {
                let loan = self.loan(c.tokenId);
                require(loan.active && loan.is_funded(), "Loan not funded")?;
                let total = loan.principal_native + loan.interest_native;
                (total, self.native_to_usd(total)?).abi_encode_params()
            }
            _ => return Err("not a view function".to_string()),
        };
        Ok(out)
    }

    fn execute_marketplace(
        &mut self,
        marketplace: Address,
        sender: Address,
        call: &LedgerCall,
    ) -> Exec {
        let decoded = IMarketplaceCalls::abi_decode(&call.input).map_err(|e| e.to_string())?;
        let now = U256::from(self.timestamp);
        match decoded {
            IMarketplaceCalls::mint(c) => {
                let id = U256::from(self.next_token);
                self.next_token += 1;
                self.owners.insert(id, sender);
                self.uris.insert(id, c.uri);
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::Transfer {
                        from: Address::ZERO,
                        to: sender,
                        tokenId: id,
                    },
                )])
            }
            IMarketplaceCalls::createSale(c) => {
                require(self.owner(c.tokenId)? == sender, "Not the owner")?;
                require(!c.priceUSD.is_zero(), "Price must be greater than zero")?;
                require(
                    !self.sales.get(&c.tokenId).is_some_and(|s| s.active),
                    "Sale already active",
                )?;
                self.sales.insert(
                    c.tokenId,
                    SaleRecord {
                        seller: sender,
                        price_usd: c.priceUSD,
                        active: true,
                    },
                );
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::SaleCreated {
                        tokenId: c.tokenId,
                        seller: sender,
                        priceUSD: c.priceUSD,
                    },
                )])
            }
            IMarketplaceCalls::purchaseNFT(c) => {
                let sale = self
                    .sales
                    .get(&c.tokenId)
                    .filter(|s| s.active)
                    .cloned()
                    .ok_or_else(|| "Sale not active".to_string())?;
                require(sale.seller != sender, "Cannot buy your own NFT")?;
                let price = self.usd_to_native(sale.price_usd)?;
                require(call.value >= price, "Insufficient payment")?;
                if let Some(s) = self.sales.get_mut(&c.tokenId) {
                    s.active = false;
                }
                self.owners.insert(c.tokenId, sender);
                Ok(vec![
                    self.log(
                        marketplace,
                        &IMarketplace::Transfer {
                            from: sale.seller,
                            to: sender,
                            tokenId: c.tokenId,
                        },
                    ),
                    self.log(
                        marketplace,
                        &IMarketplace::NFTPurchased {
                            tokenId: c.tokenId,
                            buyer: sender,
                            seller: sale.seller,
                            priceETH: call.value,
                        },
                    ),
                ])
            }
            IMarketplaceCalls::cancelSale(c) => {
                let sale = self
                    .sales
                    .get_mut(&c.tokenId)
                    .filter(|s| s.active)
                    .ok_or_else(|| "Sale not active".to_string())?;
                require(sale.seller == sender, "Not the seller")?;
                sale.active = false;
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::SaleCancelled {
                        tokenId: c.tokenId,
                        seller: sender,
                    },
                )])
            }
            IMarketplaceCalls::requestLoan(c) => {
                require(self.owner(c.tokenId)? == sender, "Not the owner")?;
                require(!c.loanAmountUSD.is_zero(), "Loan amount must be greater than zero")?;
                require(!c.durationInDays.is_zero(), "Duration must be greater than zero")?;
                require(!self.loan(c.tokenId).active, "Loan already exists")?;
                self.loans.insert(
                    c.tokenId,
                    LoanRecord {
                        principal_usd: c.loanAmountUSD,
                        duration_days: c.durationInDays,
                        borrower: sender,
                        active: true,
                        ..LoanRecord::default()
                    },
                );
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::LoanRequested {
                        tokenId: c.tokenId,
                        borrower: sender,
                        loanAmountUSD: c.loanAmountUSD,
                        durationInDays: c.durationInDays,
                    },
                )])
            }
            IMarketplaceCalls::fundLoan(c) => {
                let loan = self.loan(c.tokenId);
                require(loan.active, "Loan not active")?;
                require(!loan.is_funded(), "Loan already funded")?;
                require(loan.borrower != sender, "Cannot fund your own loan")?;
                let principal = self.usd_to_native(loan.principal_usd)?;
                require(call.value >= principal, "Incorrect loan amount")?;
                let deadline = now + loan.duration_days * U256::from(SECONDS_PER_DAY);
                let interest = Self::interest_for(principal, loan.duration_days);
                self.loans.insert(
                    c.tokenId,
                    LoanRecord {
                        principal_native: principal,
                        interest_native: interest,
                        deadline,
                        lender: sender,
                        start_time: now,
                        ..loan
                    },
                );
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::LoanFunded {
                        tokenId: c.tokenId,
                        lender: sender,
                        loanAmount: principal,
                        deadline,
                    },
                )])
            }
            IMarketplaceCalls::repayLoan(c) => {
                let loan = self.loan(c.tokenId);
                require(loan.active && loan.is_funded(), "Loan not funded")?;
                require(loan.borrower == sender, "Not the borrower")?;
                let due = loan.principal_native + loan.interest_native;
                require(call.value >= due, "Insufficient repayment")?;
                if let Some(l) = self.loans.get_mut(&c.tokenId) {
                    l.active = false;
                }
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::LoanRepaid {
                        tokenId: c.tokenId,
                        borrower: sender,
                        repaymentAmount: call.value,
                    },
                )])
            }
            IMarketplaceCalls::liquidateAsset(c) => {
                let loan = self.loan(c.tokenId);
                require(loan.active && loan.is_funded(), "Loan not funded")?;
                require(self.is_expired(&loan), "Loan not expired")?;
                Ok(vec![self.liquidate(marketplace, c.tokenId, &loan)])
            }
            IMarketplaceCalls::cancelLoanRequest(c) => {
                let loan = self.loan(c.tokenId);
                require(loan.active, "Loan not active")?;
                require(!loan.is_funded(), "Loan already funded")?;
                require(loan.borrower == sender, "Not the borrower")?;
                if let Some(l) = self.loans.get_mut(&c.tokenId) {
                    l.active = false;
                }
                Ok(vec![self.log(
                    marketplace,
                    &IMarketplace::LoanCancelled {
                        tokenId: c.tokenId,
                        borrower: sender,
                    },
                )])
            }
            IMarketplaceCalls::checkAndPrepareLiquidations(_) => {
                let expired: Vec<_> = self
                    .loans
                    .iter()
                    .filter(|(_, l)| self.is_expired(l))
                    .map(|(id, l)| (*id, l.clone()))
                    .collect();
                Ok(expired
                    .into_iter()
                    .map(|(id, loan)| self.liquidate(marketplace, id, &loan))
                    .collect())
            }
            _ => Err("function is read-only".to_string()),
        }
    }

    fn liquidate(&mut self, marketplace: Address, id: U256, loan: &LoanRecord) -> LogEntry {
        if let Some(l) = self.loans.get_mut(&id) {
            l.active = false;
        }
        self.owners.insert(id, loan.lender);
        self.log(
            marketplace,
            &IMarketplace::LoanLiquidated {
                tokenId: id,
                lender: loan.lender,
            },
        )
    }

    fn execute_activity(&mut self, activity: Address, call: &LedgerCall) -> Exec {
        let decoded = IActivityRequestCalls::abi_decode(&call.input).map_err(|e| e.to_string())?;
        let IActivityRequestCalls::sendRequest(request) = decoded;
        require(request.subscriptionId != 0, "Invalid subscription")?;
        if !self.activity_in_receipt {
            return Ok(Vec::new());
        }
        let points = self.activity_result.clone().unwrap_or_default();
        Ok(vec![self.log(
            activity,
            &IActivityRequest::ActivityCalculated {
                wallets: points.wallets,
                activityPoints: points.points,
            },
        )])
    }
}

#[async_trait]
impl Ledger for ScriptedLedger {
    fn sender(&self) -> Option<Address> {
        self.state.lock().sender
    }

    async fn call(&self, call: &LedgerCall) -> LedgerResult<Bytes> {
        let state = self.state.lock();
        if call.to != self.marketplace {
            return Err(LedgerError::Read(format!("no contract at {}", call.to)));
        }
        state
            .view(self.marketplace, &call.input)
            .map(Bytes::from)
            .map_err(|reason| LedgerError::ExecutionReverted {
                reason,
                handle: None,
            })
    }

    async fn submit(&self, call: &LedgerCall) -> LedgerResult<TransactionHandle> {
        let mut state = self.state.lock();
        if let Some(err) = state.reject_next.take() {
            return Err(err);
        }
        let sender = state
            .sender
            .ok_or_else(|| LedgerError::SubmissionFailure("no signer configured".into()))?;
        state.submissions.push(call.clone());

        let outcome = if call.to == self.marketplace {
            state.execute_marketplace(self.marketplace, sender, call)
        } else if call.to == self.activity {
            state.execute_activity(self.activity, call)
        } else {
            Err(format!("no contract at {}", call.to))
        };

        let handle = Self::next_handle(&mut state);
        state.block += 1;
        let block = state.block;
        let receipt = match outcome {
            Ok(mut logs) => {
                for (i, log) in logs.iter_mut().enumerate() {
                    log.block_number = Some(block);
                    log.log_index = Some(i as u64);
                }
                state.history.extend(logs.iter().cloned());
                Receipt::new(handle, ReceiptStatus::Included, logs, block)
            }
            Err(reason) => Receipt::new(handle, ReceiptStatus::Reverted { reason }, Vec::new(), block),
        };
        state.receipts.insert(handle, receipt);
        if state.hold_receipts {
            state.held.insert(handle);
        }
        Ok(handle)
    }

    async fn receipt(&self, handle: TransactionHandle) -> LedgerResult<Option<Receipt>> {
        self.receipt_polls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if state.held.contains(&handle) {
            return Ok(None);
        }
        Ok(state.receipts.get(&handle).cloned())
    }

    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> LedgerResult<Vec<LogEntry>> {
        self.log_reads.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.log_ranges.push((from_block, to_block));
        match state.log_reads.pop_front() {
            Some(LogRead::Logs(logs)) => Ok(logs),
            Some(LogRead::Error(msg)) => Err(LedgerError::Read(msg)),
            None => Ok(state
                .history
                .iter()
                .filter(|l| {
                    l.address == address
                        && l.block_number
                            .is_some_and(|b| (from_block..=to_block).contains(&b))
                })
                .cloned()
                .collect()),
        }
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        Ok(self.state.lock().block)
    }

    async fn block_timestamp(&self) -> LedgerResult<u64> {
        Ok(self.state.lock().timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::call::read;

    #[tokio::test]
    async fn views_decode_through_the_contract_interface() {
        let ledger = ScriptedLedger::new();
        let id = ledger.seed_token(fixture::ALICE, "ipfs://a");

        let owner = read(
            &ledger,
            ledger.marketplace(),
            IMarketplace::ownerOfCall { tokenId: id },
        )
        .await
        .unwrap();
        assert_eq!(owner, fixture::ALICE);

        let price = read(
            &ledger,
            ledger.marketplace(),
            IMarketplace::getLatestPriceCall {},
        )
        .await
        .unwrap();
        assert_eq!(price, I256::from_raw(U256::from(300_000_000_000u64)));
    }

    #[tokio::test]
    async fn rule_violations_become_reverted_receipts() {
        let ledger = ScriptedLedger::new();
        let call = LedgerCall::new(
            ledger.marketplace(),
            &IMarketplace::cancelSaleCall {
                tokenId: U256::from(1u64),
            },
        );
        let handle = ledger.submit(&call).await.unwrap();
        let receipt = ledger.receipt(handle).await.unwrap().unwrap();
        assert_eq!(
            receipt.status(),
            &ReceiptStatus::Reverted {
                reason: "Sale not active".into()
            }
        );
    }

    #[tokio::test]
    async fn held_receipts_stay_pending() {
        let ledger = ScriptedLedger::new();
        ledger.hold_receipts(true);
        let call = LedgerCall::new(
            ledger.marketplace(),
            &IMarketplace::mintCall {
                uri: "ipfs://x".into(),
            },
        );
        let handle = ledger.submit(&call).await.unwrap();
        assert!(ledger.receipt(handle).await.unwrap().is_none());

        ledger.hold_receipts(false);
        assert!(ledger.receipt(handle).await.unwrap().is_some());
    }
}
