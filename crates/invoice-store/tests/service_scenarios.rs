//! End-to-end invoice lifecycle scenarios through the service, run against
//! both storage adapters.

use std::sync::Arc;

use chrono::Utc;
use domain::{
    DomainError, Invoice, InvoiceError, InvoiceId, InvoiceService, InvoiceStatus, InvoiceStorage,
    ItemId,
};
use invoice_store::{InMemoryTable, MemoryStorage, RemoteConfig, RemoteStorage};

type Service = InvoiceService<Arc<dyn InvoiceStorage>>;

fn services() -> Vec<(&'static str, Service)> {
    vec![
        (
            "memory",
            InvoiceService::new(Arc::new(MemoryStorage::new()) as Arc<dyn InvoiceStorage>),
        ),
        (
            "remote",
            InvoiceService::new(Arc::new(RemoteStorage::new(
                InMemoryTable::new(),
                RemoteConfig::default(),
            )) as Arc<dyn InvoiceStorage>),
        ),
    ]
}

async fn stored(service: &Service, id: &InvoiceId) -> Invoice {
    service.view_invoice(id).await.unwrap().unwrap()
}

/// Creates an invoice and drives it into `status`.
async fn invoice_in(service: &Service, status: InvoiceStatus) -> Invoice {
    let invoice = service.create_invoice("John Doe").await.unwrap();
    service
        .add_invoice_item(invoice.id(), "Pen", 123, 2)
        .await
        .unwrap();

    match status {
        InvoiceStatus::Open => {}
        InvoiceStatus::Issued => service.issue_invoice(invoice.id()).await.unwrap(),
        InvoiceStatus::Paid => {
            service.issue_invoice(invoice.id()).await.unwrap();
            service.pay_invoice(invoice.id()).await.unwrap();
        }
        InvoiceStatus::Canceled => service.cancel_invoice(invoice.id()).await.unwrap(),
    }

    stored(service, invoice.id()).await
}

#[tokio::test]
async fn created_invoice_is_open_and_stored() {
    for (name, service) in services() {
        let created = service.create_invoice("John Doe").await.unwrap();

        assert_eq!(created.customer_name(), "John Doe", "adapter {name}");
        assert_eq!(created.status(), InvoiceStatus::Open, "adapter {name}");
        assert!(created.issue_date().is_none(), "adapter {name}");
        assert!(created.items().is_empty(), "adapter {name}");
        assert_eq!(stored(&service, created.id()).await, created, "adapter {name}");
    }
}

#[tokio::test]
async fn issuing_sets_issue_date_to_now() {
    for (name, service) in services() {
        let invoice = service.create_invoice("John Doe").await.unwrap();

        service.issue_invoice(invoice.id()).await.unwrap();

        let issued = stored(&service, invoice.id()).await;
        assert_eq!(issued.status(), InvoiceStatus::Issued, "adapter {name}");
        let issue_date = issued.issue_date().unwrap();
        let drift = (Utc::now() - issue_date).num_milliseconds().abs();
        assert!(drift < 1000, "adapter {name}: issue date drifted {drift}ms");
    }
}

#[tokio::test]
async fn full_lifecycle_open_issue_pay() {
    for (name, service) in services() {
        let invoice = service.create_invoice("John Doe").await.unwrap();
        service
            .update_invoice_customer(invoice.id(), "Jane Roe")
            .await
            .unwrap();
        service
            .add_invoice_item(invoice.id(), "Pen", 123, 2)
            .await
            .unwrap();
        service.issue_invoice(invoice.id()).await.unwrap();
        service.pay_invoice(invoice.id()).await.unwrap();

        let paid = stored(&service, invoice.id()).await;
        assert_eq!(paid.status(), InvoiceStatus::Paid, "adapter {name}");
        assert_eq!(paid.customer_name(), "Jane Roe", "adapter {name}");
        assert_eq!(paid.total(), Some(246), "adapter {name}");
        assert!(paid.updated_at() > invoice.updated_at(), "adapter {name}");
        assert_eq!(paid.created_at(), invoice.created_at(), "adapter {name}");
    }
}

#[tokio::test]
async fn paid_invoice_cannot_be_canceled() {
    for (name, service) in services() {
        let invoice = invoice_in(&service, InvoiceStatus::Paid).await;

        let err = service.cancel_invoice(invoice.id()).await.unwrap_err();

        assert_eq!(err.to_string(), "paid invoice cannot be canceled", "adapter {name}");
        assert_eq!(stored(&service, invoice.id()).await, invoice, "adapter {name}");
    }
}

#[tokio::test]
async fn open_and_issued_invoices_can_be_canceled() {
    for (name, service) in services() {
        for status in [InvoiceStatus::Open, InvoiceStatus::Issued] {
            let invoice = invoice_in(&service, status).await;

            service.cancel_invoice(invoice.id()).await.unwrap();

            let canceled = stored(&service, invoice.id()).await;
            assert_eq!(canceled.status(), InvoiceStatus::Canceled, "adapter {name}");
            assert_eq!(canceled.issue_date(), invoice.issue_date(), "adapter {name}");
        }
    }
}

#[tokio::test]
async fn added_item_is_stored_with_its_own_timestamp() {
    for (name, service) in services() {
        let invoice = service.create_invoice("John Doe").await.unwrap();

        let item = service
            .add_invoice_item(invoice.id(), "Pen", 123, 2)
            .await
            .unwrap();

        assert_eq!(item.product_name, "Pen", "adapter {name}");
        assert_eq!(item.price, 123, "adapter {name}");
        assert_eq!(item.qty, 2, "adapter {name}");
        assert!(item.created_at >= invoice.created_at(), "adapter {name}");

        let updated = stored(&service, invoice.id()).await;
        assert_eq!(updated.items(), &[item.clone()], "adapter {name}");
        assert_eq!(updated.item(&item.id), Some(&item), "adapter {name}");
    }
}

#[tokio::test]
async fn invalid_item_reports_every_violation() {
    for (name, service) in services() {
        let invoice = service.create_invoice("John Doe").await.unwrap();

        let err = service
            .add_invoice_item(invoice.id(), "  ", 0, 0)
            .await
            .unwrap_err();

        assert!(
            matches!(err, DomainError::Invoice(InvoiceError::InvalidItem(_))),
            "adapter {name}"
        );
        assert_eq!(
            err.to_string(),
            "invalid item: product name cannot be blank, price must be at least 1, qty must be at least 1",
            "adapter {name}"
        );
        assert_eq!(stored(&service, invoice.id()).await, invoice, "adapter {name}");
    }
}

#[tokio::test]
async fn non_open_invoices_reject_edits_and_stay_unchanged() {
    for (name, service) in services() {
        for status in [
            InvoiceStatus::Issued,
            InvoiceStatus::Paid,
            InvoiceStatus::Canceled,
        ] {
            let invoice = invoice_in(&service, status).await;
            let id = invoice.id();
            let item_id = invoice.items()[0].id.clone();

            let err = service.update_invoice_customer(id, "Someone").await.unwrap_err();
            assert_eq!(err.to_string(), format!("{status} invoice cannot be updated"));

            let err = service.add_invoice_item(id, "Ink", 1, 1).await.unwrap_err();
            assert_eq!(err.to_string(), format!("item cannot be added to {status} invoice"));

            let err = service.delete_invoice_item(id, &item_id).await.unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("item cannot be deleted from {status} invoice")
            );

            let err = service.issue_invoice(id).await.unwrap_err();
            assert_eq!(err.to_string(), format!("{status} invoice cannot be issued"));

            assert_eq!(stored(&service, id).await, invoice, "adapter {name}, {status}");
        }
    }
}

#[tokio::test]
async fn only_issued_invoices_can_be_paid() {
    for (name, service) in services() {
        for status in [
            InvoiceStatus::Open,
            InvoiceStatus::Paid,
            InvoiceStatus::Canceled,
        ] {
            let invoice = invoice_in(&service, status).await;

            let err = service.pay_invoice(invoice.id()).await.unwrap_err();

            assert_eq!(
                err.invoice_error(),
                Some(&InvoiceError::CannotPay { status }),
                "adapter {name}"
            );
            assert_eq!(stored(&service, invoice.id()).await, invoice, "adapter {name}");
        }
    }
}

#[tokio::test]
async fn deleting_an_item_is_idempotent() {
    for (name, service) in services() {
        let invoice = invoice_in(&service, InvoiceStatus::Open).await;
        let item_id = invoice.items()[0].id.clone();

        service
            .delete_invoice_item(invoice.id(), &item_id)
            .await
            .unwrap();
        let after_first = stored(&service, invoice.id()).await;
        assert!(after_first.items().is_empty(), "adapter {name}");
        assert!(after_first.updated_at() > invoice.updated_at(), "adapter {name}");

        service
            .delete_invoice_item(invoice.id(), &item_id)
            .await
            .unwrap();
        service
            .delete_invoice_item(invoice.id(), &ItemId::new())
            .await
            .unwrap();
        assert_eq!(stored(&service, invoice.id()).await, after_first, "adapter {name}");
    }
}

#[tokio::test]
async fn unknown_invoice_is_not_found_everywhere() {
    for (name, service) in services() {
        let id = InvoiceId::from("no-such-invoice");

        assert!(service.view_invoice(&id).await.unwrap().is_none(), "adapter {name}");

        let errors = [
            service.update_invoice_customer(&id, "x").await.unwrap_err(),
            service.add_invoice_item(&id, "Pen", 1, 1).await.map(|_| ()).unwrap_err(),
            service.delete_invoice_item(&id, &ItemId::new()).await.unwrap_err(),
            service.issue_invoice(&id).await.unwrap_err(),
            service.pay_invoice(&id).await.unwrap_err(),
            service.cancel_invoice(&id).await.unwrap_err(),
        ];

        for err in errors {
            assert!(err.is_not_found(), "adapter {name}: {err}");
            assert_eq!(err.to_string(), "invoice \"no-such-invoice\" not found");
        }
    }
}
