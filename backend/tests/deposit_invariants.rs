//! Property tests for balance and stock conservation across random sessions.

use std::sync::Arc;

use backend::domain::ports::{CredentialHash, DepositCommand, PurchaseCommand};
use backend::domain::{
    Cost, Deposit, DepositService, Product, ProductId, ProductName, PurchaseService, Quantity,
    Role, User, UserId, Username,
};
use backend::test_support::InMemoryAccountStore;
use proptest::prelude::*;
use tokio::runtime::Builder;

const ACCEPTED: [u64; 5] = [5, 10, 20, 50, 100];

#[derive(Debug, Clone)]
enum Step {
    Insert(u64),
    Reset,
    Buy(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => prop::sample::select(ACCEPTED.to_vec()).prop_map(Step::Insert),
        1 => (1_u64..=200).prop_filter("rejected coin", |v| !ACCEPTED.contains(v)).prop_map(Step::Insert),
        1 => Just(Step::Reset),
        3 => (1_u64..=4).prop_map(Step::Buy),
    ]
}

struct Session {
    store: Arc<InMemoryAccountStore>,
    deposits: DepositService<InMemoryAccountStore>,
    purchases: PurchaseService<InMemoryAccountStore>,
    buyer_id: UserId,
    product_id: ProductId,
}

impl Session {
    fn new(stock: u64, cost: u64) -> Self {
        let store = Arc::new(InMemoryAccountStore::new());
        let buyer = User::new(
            UserId::random(),
            Username::new("buyer@example").expect("username"),
            Deposit::ZERO,
            Role::Buyer,
        );
        let seller_id = UserId::random();
        let product = Product::new(
            ProductId::random(),
            ProductName::new("Cola").expect("name"),
            Cost::new(i64::try_from(cost).expect("cost fits")).expect("cost"),
            stock,
            seller_id,
        );
        let buyer_id = *buyer.id();
        let product_id = *product.id();
        store.seed_user(buyer, CredentialHash::new("plain$unused"));
        store.seed_product(product);
        Self {
            deposits: DepositService::new(store.clone()),
            purchases: PurchaseService::new(store.clone()),
            store,
            buyer_id,
            product_id,
        }
    }

    fn buyer(&self) -> User {
        self.store.user(&self.buyer_id).expect("buyer stored")
    }

    fn product(&self) -> Product {
        self.store.product(&self.product_id).expect("product stored")
    }
}

proptest! {
    #[test]
    fn balances_and_stock_are_conserved(
        stock in 0_u64..=20,
        cost in (1_u64..=10).prop_map(|units| units * 5),
        steps in prop::collection::vec(step(), 1..40),
    ) {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let session = Session::new(stock, cost);
        let mut expected_deposit = 0_u64;
        let mut expected_stock = stock;

        for step in steps {
            let buyer = session.buyer();
            match step {
                Step::Insert(value) => {
                    let result = runtime.block_on(session.deposits.deposit_coin(&buyer, value));
                    if ACCEPTED.contains(&value) {
                        prop_assert!(result.is_ok());
                        expected_deposit += value;
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Step::Reset => {
                    let user = runtime
                        .block_on(session.deposits.reset_deposit(&buyer))
                        .expect("reset succeeds");
                    prop_assert_eq!(user.deposit(), Deposit::ZERO);
                    expected_deposit = 0;
                }
                Step::Buy(amount) => {
                    let quantity = Quantity::new(amount).expect("positive quantity");
                    let product = session.product();
                    let result = runtime.block_on(session.purchases.buy(&buyer, &product, quantity));
                    let total = cost * amount;
                    if amount <= expected_stock && total <= expected_deposit {
                        let receipt = result.expect("purchase succeeds");
                        expected_deposit -= total;
                        expected_stock -= amount;
                        prop_assert_eq!(receipt.total_spent, total);
                        prop_assert_eq!(receipt.deposit.value(), expected_deposit);
                        prop_assert_eq!(receipt.change.total(), expected_deposit);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
            }

            let buyer = session.buyer();
            prop_assert_eq!(buyer.deposit().value(), expected_deposit);
            prop_assert_eq!(buyer.deposit().value() % 5, 0);
            prop_assert_eq!(session.product().amount_available(), expected_stock);
        }
    }
}
