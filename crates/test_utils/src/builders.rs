//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use core_kernel::{
    AdmissionId, BillId, DoctorId, Money, PatientId, ShiftId, TheaterId, UserId,
};
use domain_billing::{NewBill, NewBillItem, PaymentRequest};
use domain_ledger::{OperationStatus, PatientOperation, PaymentMethod};

use crate::fixtures::{IdFixtures, MoneyFixtures};

/// Builder for [`NewBill`] requests
pub struct NewBillBuilder {
    patient_id: PatientId,
    total_amount: Money,
    paid_amount: Money,
    items: Vec<NewBillItem>,
    shift_id: Option<ShiftId>,
    created_by: Option<UserId>,
    admission_id: Option<AdmissionId>,
}

impl Default for NewBillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewBillBuilder {
    /// Creates a builder for a 1000.00 consultation bill
    pub fn new() -> Self {
        Self {
            patient_id: IdFixtures::patient(),
            total_amount: MoneyFixtures::usd_1000(),
            paid_amount: MoneyFixtures::usd_zero(),
            items: vec![NewBillItem::new(
                "Consultation",
                MoneyFixtures::usd_1000(),
                "Doctor",
            )],
            shift_id: None,
            created_by: None,
            admission_id: None,
        }
    }

    /// Sets the patient
    pub fn for_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = patient_id;
        self
    }

    /// Sets the total and replaces the items with a single matching line
    pub fn with_total(mut self, total: Money) -> Self {
        self.total_amount = total;
        self.items = vec![NewBillItem::new("Consultation", total, "Doctor")];
        self
    }

    /// Replaces the line items
    pub fn with_items(mut self, items: Vec<NewBillItem>) -> Self {
        self.items = items;
        self
    }

    /// Sets the opening paid amount
    pub fn with_paid(mut self, paid: Money) -> Self {
        self.paid_amount = paid;
        self
    }

    /// Attributes the bill to a shift
    pub fn under_shift(mut self, shift_id: ShiftId) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// Links the bill to an admission
    pub fn for_admission(mut self, admission_id: AdmissionId) -> Self {
        self.admission_id = Some(admission_id);
        self
    }

    /// Builds the request
    pub fn build(self) -> NewBill {
        NewBill {
            patient_id: self.patient_id,
            total_amount: self.total_amount,
            paid_amount: self.paid_amount,
            items: self.items,
            shift_id: self.shift_id,
            created_by: self.created_by,
            admission_id: self.admission_id,
        }
    }
}

/// Builder for [`PaymentRequest`]s
pub struct PaymentRequestBuilder {
    bill_id: BillId,
    amount: Money,
    method: PaymentMethod,
    teller_id: UserId,
    shift_id: ShiftId,
}

impl PaymentRequestBuilder {
    /// Creates a cash payment request for a bill and shift
    pub fn new(bill_id: BillId, shift_id: ShiftId) -> Self {
        Self {
            bill_id,
            amount: MoneyFixtures::usd_1000(),
            method: PaymentMethod::Cash,
            teller_id: IdFixtures::cashier(),
            shift_id,
        }
    }

    /// Sets the amount
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the tender method
    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Builds the request
    pub fn build(self) -> PaymentRequest {
        PaymentRequest {
            bill_id: self.bill_id,
            amount: self.amount,
            method: self.method,
            teller_id: self.teller_id,
            shift_id: self.shift_id,
            reference_number: None,
            remarks: None,
        }
    }
}

/// Builder for [`PatientOperation`] records in a chosen state
pub struct OperationBuilder {
    patient_id: PatientId,
    doctor_id: DoctorId,
    status: OperationStatus,
    theater_id: Option<TheaterId>,
    scheduled_date: Option<chrono::NaiveDate>,
}

impl Default for OperationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationBuilder {
    /// Creates a builder for a freshly proposed operation
    pub fn new() -> Self {
        Self {
            patient_id: IdFixtures::patient(),
            doctor_id: IdFixtures::doctor(),
            status: OperationStatus::Proposed,
            theater_id: None,
            scheduled_date: None,
        }
    }

    /// Sets the patient
    pub fn for_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = patient_id;
        self
    }

    /// Sets the state the operation should be built in
    pub fn in_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    /// Assigns a theater and date
    pub fn booked(mut self, theater_id: TheaterId, date: chrono::NaiveDate) -> Self {
        self.theater_id = Some(theater_id);
        self.scheduled_date = Some(date);
        self
    }

    /// Builds the record
    pub fn build(self) -> PatientOperation {
        let mut operation = PatientOperation::propose(self.patient_id, self.doctor_id);
        operation.status = self.status;
        operation.theater_id = self.theater_id;
        operation.scheduled_date = self.scheduled_date;
        operation
    }
}
