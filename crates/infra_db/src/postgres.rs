//! PostgreSQL ledger store
//!
//! Maps the ledger store contract onto the durable schema. Transactions
//! are database transactions; `bill_for_update`/`operation_for_update`
//! take row locks (`SELECT ... FOR UPDATE`) so concurrent settlement
//! recomputes against the same bill serialize instead of losing updates.
//!
//! Status enums are stored as their display text; amounts are stored as
//! bare NUMERIC in the deployment currency supplied to the adapter.

use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use core_kernel::{
    AdmissionId, BedId, BillId, Currency, DoctorId, Money, OperationId, PatientId, ShiftId,
    TheaterId, UserId,
};
use domain_ledger::{
    Admission, Bed, Bill, BillItem, DoctorSchedule, DoctorSettlement, LedgerStore, LedgerTx,
    Payment, PatientOperation, StoreError, UserShift,
};

use crate::error::map_sqlx_error;

/// Runs the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))
}

/// PostgreSQL implementation of the ledger store contract
pub struct PostgresLedger {
    pool: PgPool,
    currency: Currency,
}

impl PostgresLedger {
    /// Creates a ledger over a connection pool.
    ///
    /// `currency` is the deployment currency; amounts are stored as bare
    /// NUMERIC and re-attached to it on read.
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self { pool, currency }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PgLedgerTx {
            tx,
            currency: self.currency,
        }))
    }
}

/// One database transaction
struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
    currency: Currency,
}

impl PgLedgerTx {
    fn money(&self, amount: Decimal) -> Money {
        Money::new(amount, self.currency)
    }

    fn opt_money(&self, amount: Option<Decimal>) -> Option<Money> {
        amount.map(|a| self.money(a))
    }

    fn bill_from_row(&self, row: &PgRow) -> Result<Bill, StoreError> {
        Ok(Bill {
            id: BillId::from(get::<Uuid>(row, "bill_id")?),
            patient_id: PatientId::from(get::<Uuid>(row, "patient_id")?),
            total_amount: self.money(get(row, "total_amount")?),
            paid_amount: self.money(get(row, "paid_amount")?),
            due_amount: self.money(get(row, "due_amount")?),
            status: parse(&get::<String>(row, "status")?)?,
            bill_date: get(row, "bill_date")?,
            shift_id: get::<Option<Uuid>>(row, "shift_id")?.map(ShiftId::from),
            created_by: get::<Option<String>>(row, "created_by")?.map(UserId::from),
            admission_id: get::<Option<Uuid>>(row, "admission_id")?.map(AdmissionId::from),
        })
    }

    fn payment_from_row(&self, row: &PgRow) -> Result<Payment, StoreError> {
        Ok(Payment {
            id: core_kernel::PaymentId::from(get::<Uuid>(row, "payment_id")?),
            bill_id: BillId::from(get::<Uuid>(row, "bill_id")?),
            amount: self.money(get(row, "amount")?),
            method: parse(&get::<String>(row, "payment_method")?)?,
            payment_date: get(row, "payment_date")?,
            reference_number: get(row, "reference_number")?,
            teller_id: UserId::from(get::<String>(row, "teller_id")?),
            shift_id: ShiftId::from(get::<Uuid>(row, "shift_id")?),
            remarks: get(row, "remarks")?,
        })
    }

    fn shift_from_row(&self, row: &PgRow) -> Result<UserShift, StoreError> {
        Ok(UserShift {
            id: ShiftId::from(get::<Uuid>(row, "shift_id")?),
            user_id: UserId::from(get::<String>(row, "user_id")?),
            start_time: get(row, "start_time")?,
            end_time: get(row, "end_time")?,
            starting_cash: self.money(get(row, "starting_cash")?),
            ending_cash: self.opt_money(get(row, "ending_cash")?),
            actual_cash: self.opt_money(get(row, "actual_cash")?),
            status: parse(&get::<String>(row, "status")?)?,
            notes: get(row, "notes")?,
        })
    }

    fn admission_from_row(&self, row: &PgRow) -> Result<Admission, StoreError> {
        Ok(Admission {
            id: AdmissionId::from(get::<Uuid>(row, "admission_id")?),
            patient_id: PatientId::from(get::<Uuid>(row, "patient_id")?),
            bed_id: BedId::from(get::<Uuid>(row, "bed_id")?),
            admission_date: get(row, "admission_date")?,
            discharge_date: get(row, "discharge_date")?,
            status: parse(&get::<String>(row, "status")?)?,
        })
    }

    fn bed_from_row(&self, row: &PgRow) -> Result<Bed, StoreError> {
        Ok(Bed {
            id: BedId::from(get::<Uuid>(row, "bed_id")?),
            ward: get(row, "ward")?,
            status: parse(&get::<String>(row, "status")?)?,
        })
    }

    fn operation_from_row(&self, row: &PgRow) -> Result<PatientOperation, StoreError> {
        Ok(PatientOperation {
            id: OperationId::from(get::<Uuid>(row, "operation_id")?),
            patient_id: PatientId::from(get::<Uuid>(row, "patient_id")?),
            doctor_id: DoctorId::from(get::<Uuid>(row, "doctor_id")?),
            package_id: get::<Option<Uuid>>(row, "package_id")?.map(core_kernel::PackageId::from),
            theater_id: get::<Option<Uuid>>(row, "theater_id")?.map(TheaterId::from),
            status: parse(&get::<String>(row, "status")?)?,
            scheduled_date: get(row, "scheduled_date")?,
            duration_minutes: get(row, "duration_minutes")?,
            actual_start_time: get(row, "actual_start_time")?,
            operation_cost: self.opt_money(get(row, "agreed_operation_cost")?),
            medicine_cost: self.opt_money(get(row, "agreed_medicine_cost")?),
            equipment_cost: self.opt_money(get(row, "agreed_equipment_cost")?),
            is_transferred: get(row, "is_transferred")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }

    fn schedule_from_row(&self, row: &PgRow) -> Result<DoctorSchedule, StoreError> {
        Ok(DoctorSchedule {
            id: get(row, "schedule_id")?,
            doctor_id: DoctorId::from(get::<Uuid>(row, "doctor_id")?),
            weekday: weekday_from_i16(get(row, "weekday")?)?,
            start_time: get(row, "start_time")?,
            end_time: get(row, "end_time")?,
            active: get(row, "active")?,
        })
    }

    async fn fetch_bill(&mut self, id: BillId, lock: bool) -> Result<Option<Bill>, StoreError> {
        let sql = if lock {
            "SELECT * FROM bills WHERE bill_id = $1 FOR UPDATE"
        } else {
            "SELECT * FROM bills WHERE bill_id = $1"
        };
        let row = sqlx::query(sql)
            .bind(Uuid::from(id))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.map(|r| self.bill_from_row(&r)).transpose()
    }

    async fn fetch_operation(
        &mut self,
        id: OperationId,
        lock: bool,
    ) -> Result<Option<PatientOperation>, StoreError> {
        let sql = if lock {
            "SELECT * FROM patient_operations WHERE operation_id = $1 FOR UPDATE"
        } else {
            "SELECT * FROM patient_operations WHERE operation_id = $1"
        };
        let row = sqlx::query(sql)
            .bind(Uuid::from(id))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.map(|r| self.operation_from_row(&r)).transpose()
    }
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn insert_bill(&mut self, bill: &Bill) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bills (bill_id, patient_id, total_amount, paid_amount, due_amount, \
             status, bill_date, shift_id, created_by, admission_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(Uuid::from(bill.id))
        .bind(Uuid::from(bill.patient_id))
        .bind(bill.total_amount.amount())
        .bind(bill.paid_amount.amount())
        .bind(bill.due_amount.amount())
        .bind(bill.status.to_string())
        .bind(bill.bill_date)
        .bind(bill.shift_id.map(Uuid::from))
        .bind(bill.created_by.as_ref().map(|u| u.as_str().to_string()))
        .bind(bill.admission_id.map(Uuid::from))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn insert_bill_items(&mut self, items: &[BillItem]) -> Result<(), StoreError> {
        for item in items {
            sqlx::query(
                "INSERT INTO bill_items (bill_item_id, bill_id, description, amount, category) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::from(item.id))
            .bind(Uuid::from(item.bill_id))
            .bind(&item.description)
            .bind(item.amount.amount())
            .bind(&item.category)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        }
        Ok(())
    }

    async fn bill(&mut self, id: BillId) -> Result<Option<Bill>, StoreError> {
        self.fetch_bill(id, false).await
    }

    async fn bill_for_update(&mut self, id: BillId) -> Result<Option<Bill>, StoreError> {
        self.fetch_bill(id, true).await
    }

    async fn update_bill_settlement(&mut self, bill: &Bill) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE bills SET paid_amount = $2, due_amount = $3, status = $4 WHERE bill_id = $1",
        )
        .bind(Uuid::from(bill.id))
        .bind(bill.paid_amount.amount())
        .bind(bill.due_amount.amount())
        .bind(bill.status.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Bill", bill.id));
        }
        Ok(())
    }

    async fn bill_items(&mut self, id: BillId) -> Result<Vec<BillItem>, StoreError> {
        let rows = sqlx::query("SELECT * FROM bill_items WHERE bill_id = $1")
            .bind(Uuid::from(id))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter()
            .map(|row| {
                Ok(BillItem {
                    id: core_kernel::BillItemId::from(get::<Uuid>(row, "bill_item_id")?),
                    bill_id: BillId::from(get::<Uuid>(row, "bill_id")?),
                    description: get(row, "description")?,
                    amount: self.money(get(row, "amount")?),
                    category: get(row, "category")?,
                })
            })
            .collect()
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO payments (payment_id, bill_id, amount, payment_method, payment_date, \
             reference_number, teller_id, shift_id, remarks) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.bill_id))
        .bind(payment.amount.amount())
        .bind(payment.method.to_string())
        .bind(payment.payment_date)
        .bind(payment.reference_number.as_deref())
        .bind(payment.teller_id.as_str())
        .bind(Uuid::from(payment.shift_id))
        .bind(payment.remarks.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn payments_for_bill(&mut self, id: BillId) -> Result<Vec<Payment>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM payments WHERE bill_id = $1 ORDER BY payment_date")
                .bind(Uuid::from(id))
                .fetch_all(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        rows.iter().map(|row| self.payment_from_row(row)).collect()
    }

    async fn payments_for_shift(&mut self, id: ShiftId) -> Result<Vec<Payment>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM payments WHERE shift_id = $1 ORDER BY payment_date")
                .bind(Uuid::from(id))
                .fetch_all(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        rows.iter().map(|row| self.payment_from_row(row)).collect()
    }

    async fn insert_shift(&mut self, shift: &UserShift) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_shifts (shift_id, user_id, start_time, end_time, starting_cash, \
             ending_cash, actual_cash, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::from(shift.id))
        .bind(shift.user_id.as_str())
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(shift.starting_cash.amount())
        .bind(shift.ending_cash.map(|m| m.amount()))
        .bind(shift.actual_cash.map(|m| m.amount()))
        .bind(shift.status.to_string())
        .bind(shift.notes.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_shift(&mut self, shift: &UserShift) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE user_shifts SET end_time = $2, ending_cash = $3, actual_cash = $4, \
             status = $5, notes = $6 WHERE shift_id = $1",
        )
        .bind(Uuid::from(shift.id))
        .bind(shift.end_time)
        .bind(shift.ending_cash.map(|m| m.amount()))
        .bind(shift.actual_cash.map(|m| m.amount()))
        .bind(shift.status.to_string())
        .bind(shift.notes.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("UserShift", shift.id));
        }
        Ok(())
    }

    async fn shift(&mut self, id: ShiftId) -> Result<Option<UserShift>, StoreError> {
        let row = sqlx::query("SELECT * FROM user_shifts WHERE shift_id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.map(|r| self.shift_from_row(&r)).transpose()
    }

    async fn open_shifts_for_user(&mut self, user: &UserId) -> Result<Vec<UserShift>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM user_shifts WHERE user_id = $1 AND status = 'Open' \
             ORDER BY start_time DESC",
        )
        .bind(user.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows.iter().map(|row| self.shift_from_row(row)).collect()
    }

    async fn insert_admission(&mut self, admission: &Admission) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO admissions (admission_id, patient_id, bed_id, admission_date, \
             discharge_date, status) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::from(admission.id))
        .bind(Uuid::from(admission.patient_id))
        .bind(Uuid::from(admission.bed_id))
        .bind(admission.admission_date)
        .bind(admission.discharge_date)
        .bind(admission.status.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn admission(&mut self, id: AdmissionId) -> Result<Option<Admission>, StoreError> {
        let row = sqlx::query("SELECT * FROM admissions WHERE admission_id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.map(|r| self.admission_from_row(&r)).transpose()
    }

    async fn update_admission(&mut self, admission: &Admission) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE admissions SET discharge_date = $2, status = $3 WHERE admission_id = $1",
        )
        .bind(Uuid::from(admission.id))
        .bind(admission.discharge_date)
        .bind(admission.status.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Admission", admission.id));
        }
        Ok(())
    }

    async fn insert_bed(&mut self, bed: &Bed) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO beds (bed_id, ward, status) VALUES ($1, $2, $3)")
            .bind(Uuid::from(bed.id))
            .bind(&bed.ward)
            .bind(bed.status.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn bed(&mut self, id: BedId) -> Result<Option<Bed>, StoreError> {
        let row = sqlx::query("SELECT * FROM beds WHERE bed_id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.map(|r| self.bed_from_row(&r)).transpose()
    }

    async fn update_bed(&mut self, bed: &Bed) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE beds SET ward = $2, status = $3 WHERE bed_id = $1")
            .bind(Uuid::from(bed.id))
            .bind(&bed.ward)
            .bind(bed.status.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Bed", bed.id));
        }
        Ok(())
    }

    async fn insert_operation(&mut self, operation: &PatientOperation) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO patient_operations (operation_id, patient_id, doctor_id, package_id, \
             theater_id, status, scheduled_date, duration_minutes, actual_start_time, \
             agreed_operation_cost, agreed_medicine_cost, agreed_equipment_cost, is_transferred, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(Uuid::from(operation.id))
        .bind(Uuid::from(operation.patient_id))
        .bind(Uuid::from(operation.doctor_id))
        .bind(operation.package_id.map(Uuid::from))
        .bind(operation.theater_id.map(Uuid::from))
        .bind(operation.status.to_string())
        .bind(operation.scheduled_date)
        .bind(operation.duration_minutes)
        .bind(operation.actual_start_time)
        .bind(operation.operation_cost.map(|m| m.amount()))
        .bind(operation.medicine_cost.map(|m| m.amount()))
        .bind(operation.equipment_cost.map(|m| m.amount()))
        .bind(operation.is_transferred)
        .bind(operation.created_at)
        .bind(operation.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn operation(&mut self, id: OperationId) -> Result<Option<PatientOperation>, StoreError> {
        self.fetch_operation(id, false).await
    }

    async fn operation_for_update(
        &mut self,
        id: OperationId,
    ) -> Result<Option<PatientOperation>, StoreError> {
        self.fetch_operation(id, true).await
    }

    async fn update_operation(&mut self, operation: &PatientOperation) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE patient_operations SET doctor_id = $2, package_id = $3, theater_id = $4, \
             status = $5, scheduled_date = $6, duration_minutes = $7, actual_start_time = $8, \
             agreed_operation_cost = $9, agreed_medicine_cost = $10, agreed_equipment_cost = $11, \
             is_transferred = $12, updated_at = $13 WHERE operation_id = $1",
        )
        .bind(Uuid::from(operation.id))
        .bind(Uuid::from(operation.doctor_id))
        .bind(operation.package_id.map(Uuid::from))
        .bind(operation.theater_id.map(Uuid::from))
        .bind(operation.status.to_string())
        .bind(operation.scheduled_date)
        .bind(operation.duration_minutes)
        .bind(operation.actual_start_time)
        .bind(operation.operation_cost.map(|m| m.amount()))
        .bind(operation.medicine_cost.map(|m| m.amount()))
        .bind(operation.equipment_cost.map(|m| m.amount()))
        .bind(operation.is_transferred)
        .bind(operation.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("PatientOperation", operation.id));
        }
        Ok(())
    }

    async fn operations_awaiting_deposit(
        &mut self,
        patient: PatientId,
    ) -> Result<Vec<PatientOperation>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM patient_operations WHERE patient_id = $1 \
             AND status IN ('PendingDeposit', 'AdvancePaymentRequested') ORDER BY created_at",
        )
        .bind(Uuid::from(patient))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows.iter().map(|row| self.operation_from_row(row)).collect()
    }

    async fn operations_for_theater_on(
        &mut self,
        theater: TheaterId,
        date: NaiveDate,
    ) -> Result<Vec<PatientOperation>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM patient_operations WHERE theater_id = $1 AND scheduled_date = $2 \
             AND status IN ('Scheduled', 'Running')",
        )
        .bind(Uuid::from(theater))
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        rows.iter().map(|row| self.operation_from_row(row)).collect()
    }

    async fn insert_schedule(&mut self, schedule: &DoctorSchedule) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO doctor_schedules (schedule_id, doctor_id, weekday, start_time, \
             end_time, active) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(schedule.id)
        .bind(Uuid::from(schedule.doctor_id))
        .bind(weekday_to_i16(schedule.weekday))
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .bind(schedule.active)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn schedules_for_doctor(
        &mut self,
        doctor: DoctorId,
    ) -> Result<Vec<DoctorSchedule>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM doctor_schedules WHERE doctor_id = $1 AND active")
                .bind(Uuid::from(doctor))
                .fetch_all(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        rows.iter().map(|row| self.schedule_from_row(row)).collect()
    }

    async fn insert_doctor_settlement(
        &mut self,
        settlement: &DoctorSettlement,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO doctor_settlements (settlement_id, doctor_id, amount, period_start, \
             period_end, paid_at, reference, remarks) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::from(settlement.id))
        .bind(Uuid::from(settlement.doctor_id))
        .bind(settlement.amount.amount())
        .bind(settlement.period_start)
        .bind(settlement.period_end)
        .bind(settlement.paid_at)
        .bind(settlement.reference.as_deref())
        .bind(settlement.remarks.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column).map_err(map_sqlx_error)
}

fn parse<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T, StoreError> {
    value.parse().map_err(StoreError::Serialization)
}

fn weekday_to_i16(weekday: Weekday) -> i16 {
    weekday.num_days_from_monday() as i16
}

fn weekday_from_i16(value: i16) -> Result<Weekday, StoreError> {
    match value {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        other => Err(StoreError::Serialization(format!(
            "weekday out of range: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_round_trip() {
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert_eq!(weekday_from_i16(weekday_to_i16(weekday)).unwrap(), weekday);
        }
    }

    #[test]
    fn test_weekday_out_of_range_rejected() {
        assert!(weekday_from_i16(7).is_err());
    }
}
