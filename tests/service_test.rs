// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Domain service integration tests: balance mutation, validation, and
//! compensating rollback behavior.

use chrono::NaiveDate;
use wallet_ledger_rs::service::{
    CreateBalance, CreateCard, CreateMerchant, CreateTopUp, CreateTransaction, CreateTransfer,
    CreateUser, CreateWithdrawal, UpdateTopUp, UpdateTransaction, UpdateTransfer,
    UpdateWithdrawal,
};
use wallet_ledger_rs::{Balance, Card, Ledger, LedgerError, Merchant, User};

/// Registers a user with a card and an opened balance.
fn seed_wallet(ledger: &Ledger, n: u32, total: i64) -> (User, Card, Balance) {
    let user = ledger
        .users
        .create(CreateUser {
            name: format!("user-{n}"),
            email: format!("user-{n}@example.com"),
        })
        .unwrap();
    let card = ledger
        .cards
        .create(CreateCard {
            user_id: user.id,
            card_number: format!("4111-{n:04}"),
            card_type: "debit".into(),
            expire_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            provider: "visa".into(),
        })
        .unwrap();
    let balance = ledger
        .balances
        .create(CreateBalance {
            card_id: card.id,
            total,
        })
        .unwrap();
    (user, card, balance)
}

/// Registers a merchant whose owner has a wallet of their own.
fn seed_merchant(ledger: &Ledger, n: u32, settlement_total: i64) -> (Merchant, Balance) {
    let (owner, _, balance) = seed_wallet(ledger, n, settlement_total);
    let merchant = ledger
        .merchants
        .create(CreateMerchant {
            name: format!("merchant-{n}"),
            user_id: owner.id,
        })
        .unwrap();
    (merchant, balance)
}

fn total_of(ledger: &Ledger, balance: &Balance) -> i64 {
    ledger.balances.find_by_id(balance.id).unwrap().total
}

// === Top-ups ===

#[test]
fn topup_debits_balance_and_persists_record() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000);

    let topup = ledger
        .topups
        .create(CreateTopUp {
            user_id: user.id,
            topup_no: "TOPUP-001".into(),
            amount: 50_000,
            method: "bank_transfer".into(),
        })
        .unwrap();

    assert_eq!(topup.id.0, 1);
    assert_eq!(topup.amount, 50_000);
    assert_eq!(total_of(&ledger, &balance), 50_000);
    assert_eq!(ledger.topups.find_by_user_id(user.id).len(), 1);
}

#[test]
fn topup_amount_bounds_are_enforced() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000_000);

    let below = ledger.topups.create(CreateTopUp {
        user_id: user.id,
        topup_no: "TOPUP-001".into(),
        amount: 49_999,
        method: "bank_transfer".into(),
    });
    assert!(matches!(below, Err(LedgerError::Validation(_))));

    let above = ledger.topups.create(CreateTopUp {
        user_id: user.id,
        topup_no: "TOPUP-002".into(),
        amount: 10_000_001,
        method: "bank_transfer".into(),
    });
    assert!(matches!(above, Err(LedgerError::Validation(_))));

    assert_eq!(total_of(&ledger, &balance), 100_000_000);
}

#[test]
fn topup_rejects_unrecognized_method() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000);

    let result = ledger.topups.create(CreateTopUp {
        user_id: user.id,
        topup_no: "TOPUP-001".into(),
        amount: 50_000,
        method: "carrier_pigeon".into(),
    });
    assert!(matches!(result, Err(LedgerError::Validation(_))));
    assert_eq!(total_of(&ledger, &balance), 100_000);
}

#[test]
fn topup_insufficient_balance_commits_nothing() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 40_000);

    let result = ledger.topups.create(CreateTopUp {
        user_id: user.id,
        topup_no: "TOPUP-001".into(),
        amount: 50_000,
        method: "bank_transfer".into(),
    });
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(total_of(&ledger, &balance), 40_000);
    assert!(ledger.topups.find_by_user_id(user.id).is_empty());
}

#[test]
fn duplicate_topup_reference_rolls_back_the_debit() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 200_000);

    ledger
        .topups
        .create(CreateTopUp {
            user_id: user.id,
            topup_no: "TOPUP-001".into(),
            amount: 50_000,
            method: "bank_transfer".into(),
        })
        .unwrap();
    let result = ledger.topups.create(CreateTopUp {
        user_id: user.id,
        topup_no: "TOPUP-001".into(),
        amount: 60_000,
        method: "e_wallet".into(),
    });

    assert_eq!(result, Err(LedgerError::Conflict));
    // Only the first debit survives; the second was compensated.
    assert_eq!(total_of(&ledger, &balance), 150_000);
    assert_eq!(ledger.topups.find_by_user_id(user.id).len(), 1);
}

#[test]
fn topup_update_rederives_balance_from_amount_difference() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 300_000);

    let topup = ledger
        .topups
        .create(CreateTopUp {
            user_id: user.id,
            topup_no: "TOPUP-001".into(),
            amount: 100_000,
            method: "bank_transfer".into(),
        })
        .unwrap();
    assert_eq!(total_of(&ledger, &balance), 200_000);

    // 300_000 - 60_000: the old debit is credited back, the new one applied.
    let updated = ledger
        .topups
        .update(
            topup.id,
            UpdateTopUp {
                amount: 60_000,
                method: "e_wallet".into(),
            },
        )
        .unwrap();
    assert_eq!(updated.amount, 60_000);
    assert_eq!(total_of(&ledger, &balance), 240_000);
}

#[test]
fn topup_update_revalidates_against_restored_balance() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000);

    let topup = ledger
        .topups
        .create(CreateTopUp {
            user_id: user.id,
            topup_no: "TOPUP-001".into(),
            amount: 80_000,
            method: "bank_transfer".into(),
        })
        .unwrap();
    assert_eq!(total_of(&ledger, &balance), 20_000);

    // The restored balance is 100_000, so 90_000 fits even though the
    // current total does not cover it.
    ledger
        .topups
        .update(
            topup.id,
            UpdateTopUp {
                amount: 90_000,
                method: "bank_transfer".into(),
            },
        )
        .unwrap();
    assert_eq!(total_of(&ledger, &balance), 10_000);

    // 110_000 exceeds even the restored balance.
    let result = ledger.topups.update(
        topup.id,
        UpdateTopUp {
            amount: 110_000,
            method: "bank_transfer".into(),
        },
    );
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(total_of(&ledger, &balance), 10_000);
}

#[test]
fn topup_delete_does_not_reverse_the_balance_effect() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 200_000);

    let topup = ledger
        .topups
        .create(CreateTopUp {
            user_id: user.id,
            topup_no: "TOPUP-001".into(),
            amount: 50_000,
            method: "bank_transfer".into(),
        })
        .unwrap();
    ledger.topups.delete(topup.id).unwrap();

    assert_eq!(total_of(&ledger, &balance), 150_000);
    assert!(ledger.topups.find_by_user_id(user.id).is_empty());
}

// === Withdrawals ===

#[test]
fn withdrawal_debits_balance_and_stamps_last_withdrawal() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000);

    let withdrawal = ledger
        .withdrawals
        .create(CreateWithdrawal {
            user_id: user.id,
            amount: 30_000,
        })
        .unwrap();

    let current = ledger.balances.find_by_id(balance.id).unwrap();
    assert_eq!(current.total, 70_000);
    assert_eq!(current.withdraw_amount, 30_000);
    assert_eq!(current.withdraw_time, Some(withdrawal.created_at));
}

#[test]
fn withdrawal_insufficient_funds_commits_nothing() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 20_000);

    let result = ledger.withdrawals.create(CreateWithdrawal {
        user_id: user.id,
        amount: 30_000,
    });
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(total_of(&ledger, &balance), 20_000);
    assert!(ledger.withdrawals.find_by_user_id(user.id).is_empty());
}

#[test]
fn withdrawal_for_user_without_balance_is_not_found() {
    let ledger = Ledger::default();
    let user = ledger
        .users
        .create(CreateUser {
            name: "nobody".into(),
            email: "nobody@example.com".into(),
        })
        .unwrap();

    let result = ledger.withdrawals.create(CreateWithdrawal {
        user_id: user.id,
        amount: 10_000,
    });
    assert_eq!(result, Err(LedgerError::NotFound));
}

#[test]
fn withdrawal_update_restores_before_revalidating() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000);

    let withdrawal = ledger
        .withdrawals
        .create(CreateWithdrawal {
            user_id: user.id,
            amount: 60_000,
        })
        .unwrap();
    assert_eq!(total_of(&ledger, &balance), 40_000);

    // Restored balance is 100_000; 90_000 fits.
    ledger
        .withdrawals
        .update(withdrawal.id, UpdateWithdrawal { amount: 90_000 })
        .unwrap();
    assert_eq!(total_of(&ledger, &balance), 10_000);

    // 110_000 exceeds the restored balance; nothing changes.
    let result = ledger
        .withdrawals
        .update(withdrawal.id, UpdateWithdrawal { amount: 110_000 });
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(total_of(&ledger, &balance), 10_000);
}

#[test]
fn withdrawal_delete_does_not_reverse_the_balance_effect() {
    let ledger = Ledger::default();
    let (user, _, balance) = seed_wallet(&ledger, 1, 100_000);

    let withdrawal = ledger
        .withdrawals
        .create(CreateWithdrawal {
            user_id: user.id,
            amount: 30_000,
        })
        .unwrap();
    ledger.withdrawals.delete(withdrawal.id).unwrap();

    assert_eq!(total_of(&ledger, &balance), 70_000);
}

// === Transfers ===

#[test]
fn transfer_debits_sender_and_credits_receiver() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 100);
    let (receiver, _, receiver_balance) = seed_wallet(&ledger, 2, 50);

    let transfer = ledger
        .transfers
        .create(CreateTransfer {
            sender_id: sender.id,
            receiver_id: receiver.id,
            amount: 30,
        })
        .unwrap();

    assert_eq!(transfer.id.0, 1);
    assert_eq!(total_of(&ledger, &sender_balance), 70);
    assert_eq!(total_of(&ledger, &receiver_balance), 80);
    assert_eq!(ledger.transfers.find_all().unwrap().len(), 1);
}

#[test]
fn transfer_with_missing_receiver_leaves_sender_untouched() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 100);
    let receiver = ledger
        .users
        .create(CreateUser {
            name: "no-balance".into(),
            email: "no-balance@example.com".into(),
        })
        .unwrap();

    let result = ledger.transfers.create(CreateTransfer {
        sender_id: sender.id,
        receiver_id: receiver.id,
        amount: 30,
    });
    assert_eq!(result, Err(LedgerError::NotFound));
    assert_eq!(total_of(&ledger, &sender_balance), 100);
    assert!(ledger.transfers.find_all().is_err());
}

#[test]
fn transfer_to_self_is_rejected() {
    let ledger = Ledger::default();
    let (sender, _, _) = seed_wallet(&ledger, 1, 100);

    let result = ledger.transfers.create(CreateTransfer {
        sender_id: sender.id,
        receiver_id: sender.id,
        amount: 30,
    });
    assert!(matches!(result, Err(LedgerError::Validation(_))));
}

#[test]
fn transfer_insufficient_sender_funds_commits_nothing() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 20);
    let (receiver, _, receiver_balance) = seed_wallet(&ledger, 2, 50);

    let result = ledger.transfers.create(CreateTransfer {
        sender_id: sender.id,
        receiver_id: receiver.id,
        amount: 30,
    });
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(total_of(&ledger, &sender_balance), 20);
    assert_eq!(total_of(&ledger, &receiver_balance), 50);
}

#[test]
fn transfer_into_maxed_out_receiver_compensates_the_sender() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 100);
    let (receiver, _, receiver_balance) = seed_wallet(&ledger, 2, i64::MAX);

    let result = ledger.transfers.create(CreateTransfer {
        sender_id: sender.id,
        receiver_id: receiver.id,
        amount: 5,
    });

    // The receiver-side credit is rejected instead of overflowing; the
    // already-committed sender debit is credited back.
    assert!(matches!(result, Err(LedgerError::Validation(_))));
    assert_eq!(total_of(&ledger, &sender_balance), 100);
    assert_eq!(total_of(&ledger, &receiver_balance), i64::MAX);
    assert!(ledger.transfers.find_all().is_err());
}

#[test]
fn transfer_update_adjusts_both_sides_by_the_difference() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 100);
    let (receiver, _, receiver_balance) = seed_wallet(&ledger, 2, 50);

    let transfer = ledger
        .transfers
        .create(CreateTransfer {
            sender_id: sender.id,
            receiver_id: receiver.id,
            amount: 30,
        })
        .unwrap();

    ledger
        .transfers
        .update(transfer.id, UpdateTransfer { amount: 50 })
        .unwrap();
    assert_eq!(total_of(&ledger, &sender_balance), 50);
    assert_eq!(total_of(&ledger, &receiver_balance), 100);
}

#[test]
fn transfer_update_compensates_sender_when_receiver_side_fails() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 100);
    let (receiver, _, receiver_balance) = seed_wallet(&ledger, 2, 50);

    let transfer = ledger
        .transfers
        .create(CreateTransfer {
            sender_id: sender.id,
            receiver_id: receiver.id,
            amount: 30,
        })
        .unwrap();

    // The receiver spends the transferred funds, so undoing the old credit
    // can no longer be covered.
    ledger
        .withdrawals
        .create(CreateWithdrawal {
            user_id: receiver.id,
            amount: 80,
        })
        .unwrap();
    assert_eq!(total_of(&ledger, &receiver_balance), 0);

    let result = ledger
        .transfers
        .update(transfer.id, UpdateTransfer { amount: 50 });
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    // The sender-side adjustment was reversed.
    assert_eq!(total_of(&ledger, &sender_balance), 70);
    assert_eq!(
        ledger.transfers.find_by_id(transfer.id).unwrap().amount,
        30
    );
}

#[test]
fn transfer_delete_does_not_reverse_either_balance() {
    let ledger = Ledger::default();
    let (sender, _, sender_balance) = seed_wallet(&ledger, 1, 100);
    let (receiver, _, receiver_balance) = seed_wallet(&ledger, 2, 50);

    let transfer = ledger
        .transfers
        .create(CreateTransfer {
            sender_id: sender.id,
            receiver_id: receiver.id,
            amount: 30,
        })
        .unwrap();
    ledger.transfers.delete(transfer.id).unwrap();

    assert_eq!(total_of(&ledger, &sender_balance), 70);
    assert_eq!(total_of(&ledger, &receiver_balance), 80);
}

#[test]
fn transfer_find_by_user_covers_both_sides() {
    let ledger = Ledger::default();
    let (a, _, _) = seed_wallet(&ledger, 1, 100);
    let (b, _, _) = seed_wallet(&ledger, 2, 100);
    let (c, _, _) = seed_wallet(&ledger, 3, 100);

    ledger
        .transfers
        .create(CreateTransfer {
            sender_id: a.id,
            receiver_id: b.id,
            amount: 10,
        })
        .unwrap();
    ledger
        .transfers
        .create(CreateTransfer {
            sender_id: c.id,
            receiver_id: a.id,
            amount: 10,
        })
        .unwrap();

    assert_eq!(ledger.transfers.find_by_user_id(a.id).len(), 2);
    assert_eq!(ledger.transfers.find_by_user_id(b.id).len(), 1);
}

// === Merchant transactions ===

#[test]
fn transaction_debits_payer_and_credits_merchant_settlement() {
    let ledger = Ledger::default();
    let (_, payer_card, payer_balance) = seed_wallet(&ledger, 1, 100_000);
    let (merchant, settlement_balance) = seed_merchant(&ledger, 2, 10_000);

    let transaction = ledger
        .transactions
        .create(
            &merchant.api_key,
            CreateTransaction {
                card_number: payer_card.card_number.clone(),
                amount: 40_000,
                payment_method: "e_wallet".into(),
            },
        )
        .unwrap();

    assert_eq!(transaction.card_id, payer_card.id);
    assert_eq!(transaction.merchant_id, merchant.id);
    assert_eq!(total_of(&ledger, &payer_balance), 60_000);
    assert_eq!(total_of(&ledger, &settlement_balance), 50_000);
}

#[test]
fn transaction_restores_payer_when_settlement_chain_breaks() {
    let ledger = Ledger::default();
    let (_, payer_card, payer_balance) = seed_wallet(&ledger, 1, 1_000);

    // Merchant owner exists but holds no card, so the settlement lookup
    // fails after the payer debit.
    let owner = ledger
        .users
        .create(CreateUser {
            name: "cardless".into(),
            email: "cardless@example.com".into(),
        })
        .unwrap();
    let merchant = ledger
        .merchants
        .create(CreateMerchant {
            name: "shop".into(),
            user_id: owner.id,
        })
        .unwrap();

    let result = ledger.transactions.create(
        &merchant.api_key,
        CreateTransaction {
            card_number: payer_card.card_number.clone(),
            amount: 500,
            payment_method: "e_wallet".into(),
        },
    );

    assert_eq!(result, Err(LedgerError::NotFound));
    assert_eq!(total_of(&ledger, &payer_balance), 1_000);
    assert!(ledger.transactions.find_all().is_err());
}

#[test]
fn transaction_with_unknown_api_key_is_not_found() {
    let ledger = Ledger::default();
    let (_, payer_card, payer_balance) = seed_wallet(&ledger, 1, 1_000);

    let result = ledger.transactions.create(
        "no-such-key",
        CreateTransaction {
            card_number: payer_card.card_number.clone(),
            amount: 500,
            payment_method: "e_wallet".into(),
        },
    );
    assert_eq!(result, Err(LedgerError::NotFound));
    assert_eq!(total_of(&ledger, &payer_balance), 1_000);
}

#[test]
fn transaction_insufficient_payer_funds_commits_nothing() {
    let ledger = Ledger::default();
    let (_, payer_card, payer_balance) = seed_wallet(&ledger, 1, 100);
    let (merchant, settlement_balance) = seed_merchant(&ledger, 2, 0);

    let result = ledger.transactions.create(
        &merchant.api_key,
        CreateTransaction {
            card_number: payer_card.card_number.clone(),
            amount: 500,
            payment_method: "e_wallet".into(),
        },
    );
    assert_eq!(result, Err(LedgerError::InsufficientFunds));
    assert_eq!(total_of(&ledger, &payer_balance), 100);
    assert_eq!(total_of(&ledger, &settlement_balance), 0);
}

#[test]
fn transaction_update_requires_the_recording_merchants_key() {
    let ledger = Ledger::default();
    let (_, payer_card, _) = seed_wallet(&ledger, 1, 100_000);
    let (merchant, _) = seed_merchant(&ledger, 2, 0);
    let (other_merchant, _) = seed_merchant(&ledger, 3, 0);

    let transaction = ledger
        .transactions
        .create(
            &merchant.api_key,
            CreateTransaction {
                card_number: payer_card.card_number.clone(),
                amount: 40_000,
                payment_method: "e_wallet".into(),
            },
        )
        .unwrap();

    let result = ledger.transactions.update(
        &other_merchant.api_key,
        transaction.id,
        UpdateTransaction {
            amount: 20_000,
            payment_method: "e_wallet".into(),
        },
    );
    assert_eq!(result, Err(LedgerError::Unauthorized));
    assert_eq!(
        ledger
            .transactions
            .find_by_id(transaction.id)
            .unwrap()
            .amount,
        40_000
    );
}

#[test]
fn transaction_update_restores_old_charge_before_applying_new() {
    let ledger = Ledger::default();
    let (_, payer_card, payer_balance) = seed_wallet(&ledger, 1, 100_000);
    let (merchant, settlement_balance) = seed_merchant(&ledger, 2, 0);

    let transaction = ledger
        .transactions
        .create(
            &merchant.api_key,
            CreateTransaction {
                card_number: payer_card.card_number.clone(),
                amount: 40_000,
                payment_method: "e_wallet".into(),
            },
        )
        .unwrap();

    ledger
        .transactions
        .update(
            &merchant.api_key,
            transaction.id,
            UpdateTransaction {
                amount: 25_000,
                payment_method: "bank_transfer".into(),
            },
        )
        .unwrap();

    assert_eq!(total_of(&ledger, &payer_balance), 75_000);
    assert_eq!(total_of(&ledger, &settlement_balance), 25_000);
}

#[test]
fn transaction_delete_does_not_reverse_either_balance() {
    let ledger = Ledger::default();
    let (_, payer_card, payer_balance) = seed_wallet(&ledger, 1, 100_000);
    let (merchant, settlement_balance) = seed_merchant(&ledger, 2, 0);

    let transaction = ledger
        .transactions
        .create(
            &merchant.api_key,
            CreateTransaction {
                card_number: payer_card.card_number.clone(),
                amount: 40_000,
                payment_method: "e_wallet".into(),
            },
        )
        .unwrap();
    ledger.transactions.delete(transaction.id).unwrap();

    assert_eq!(total_of(&ledger, &payer_balance), 60_000);
    assert_eq!(total_of(&ledger, &settlement_balance), 40_000);
    assert!(ledger.transactions.find_by_merchant_id(merchant.id).is_empty());
}

// === Cards, users, merchants, balances ===

#[test]
fn second_card_for_a_user_conflicts() {
    let ledger = Ledger::default();
    let (user, _, _) = seed_wallet(&ledger, 1, 0);

    let result = ledger.cards.create(CreateCard {
        user_id: user.id,
        card_number: "4111-9999".into(),
        card_type: "credit".into(),
        expire_date: NaiveDate::from_ymd_opt(2031, 6, 1).unwrap(),
        provider: "visa".into(),
    });
    assert_eq!(result, Err(LedgerError::Conflict));
    assert_eq!(ledger.cards.find_all().unwrap().len(), 1);
}

#[test]
fn duplicate_card_number_conflicts() {
    let ledger = Ledger::default();
    let (_, card, _) = seed_wallet(&ledger, 1, 0);
    let other = ledger
        .users
        .create(CreateUser {
            name: "other".into(),
            email: "other@example.com".into(),
        })
        .unwrap();

    let result = ledger.cards.create(CreateCard {
        user_id: other.id,
        card_number: card.card_number.clone(),
        card_type: "debit".into(),
        expire_date: NaiveDate::from_ymd_opt(2031, 6, 1).unwrap(),
        provider: "visa".into(),
    });
    assert_eq!(result, Err(LedgerError::Conflict));
}

#[test]
fn duplicate_email_conflicts() {
    let ledger = Ledger::default();
    ledger
        .users
        .create(CreateUser {
            name: "a".into(),
            email: "same@example.com".into(),
        })
        .unwrap();
    let result = ledger.users.create(CreateUser {
        name: "b".into(),
        email: "same@example.com".into(),
    });
    assert_eq!(result, Err(LedgerError::Conflict));
}

#[test]
fn second_balance_for_a_card_conflicts() {
    let ledger = Ledger::default();
    let (_, card, _) = seed_wallet(&ledger, 1, 1_000);

    let result = ledger.balances.create(CreateBalance {
        card_id: card.id,
        total: 5_000,
    });
    assert_eq!(result, Err(LedgerError::Conflict));
}

#[test]
fn negative_opening_balance_is_rejected() {
    let ledger = Ledger::default();
    let (_, card, _) = seed_wallet(&ledger, 1, 0);
    ledger.balances.delete(ledger.balances.find_by_card_id(card.id).unwrap().id).unwrap();

    let result = ledger.balances.create(CreateBalance {
        card_id: card.id,
        total: -1,
    });
    assert!(matches!(result, Err(LedgerError::Validation(_))));
}

#[test]
fn merchant_api_keys_are_unique_and_resolvable() {
    let ledger = Ledger::default();
    let (merchant_a, _) = seed_merchant(&ledger, 1, 0);
    let (merchant_b, _) = seed_merchant(&ledger, 2, 0);

    assert_ne!(merchant_a.api_key, merchant_b.api_key);
    assert_eq!(
        ledger
            .merchants
            .find_by_api_key(&merchant_a.api_key)
            .unwrap()
            .id,
        merchant_a.id
    );
}

#[test]
fn card_delete_leaves_balance_dangling() {
    let ledger = Ledger::default();
    let (_, card, balance) = seed_wallet(&ledger, 1, 1_000);

    ledger.cards.delete(card.id).unwrap();

    // No cascading delete: the balance record survives its card.
    assert_eq!(total_of(&ledger, &balance), 1_000);
}
