use common_utils::request::Method;
use domain_types::connector_types::{
    ConnectorResult, FieldTransform, OperationDescriptor, Params, WireEncoding,
};
use interfaces::connector_types::OperationKind;

pub const TRANSACTION_ID: &str = "TRANSACTION_ID";
pub const REFUND_TRANS_ID: &str = "REFUND_TRANS_ID";

const AMOUNT_AND_CURRENCY: &[(&str, FieldTransform)] = &[
    ("amount", FieldTransform::MinorUnits),
    ("currency", FieldTransform::CurrencyCode),
];

const fn command(name: &'static str) -> OperationDescriptor {
    OperationDescriptor::new(name, Method::Post, "", WireEncoding::FormUrlEncoded)
        .transforms(AMOUNT_AND_CURRENCY)
}

/// Commands of the card gateway merchant handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TbcOperation {
    GetTransId,
    CheckTransStatus,
    ReversalTrans,
    RefundTrans,
    PreAuthTrans,
    ConfirmPreAuthTrans,
    CardRegisterWithDeduction,
    CardRegisterWithZeroAuth,
    RecurringPayment,
    RefundToDebitCard,
    EndOfBusinessDay,
}

impl OperationKind for TbcOperation {
    fn descriptor(self) -> OperationDescriptor {
        match self {
            Self::GetTransId => command("get_trans_id")
                .required(&["amount", "currency", "client_ip_addr", "description"])
                .constants(&[("command", "v"), ("language", "ka"), ("msg_type", "SMS")]),
            Self::CheckTransStatus => command("check_trans_status")
                .required(&["trans_id", "client_ip_addr"])
                .constants(&[("command", "c")]),
            Self::ReversalTrans => command("reversal_trans")
                .required(&["trans_id", "amount"])
                .constants(&[("command", "r")]),
            Self::RefundTrans => command("refund_trans")
                .required(&["trans_id", "amount"])
                .constants(&[("command", "k")]),
            Self::PreAuthTrans => command("pre_auth_trans")
                .required(&["amount", "currency", "client_ip_addr", "description"])
                .constants(&[("command", "a"), ("language", "ka"), ("msg_type", "DMS")]),
            Self::ConfirmPreAuthTrans => command("confirm_pre_auth_trans")
                .required(&["trans_id", "amount", "currency", "client_ip_addr", "description"])
                .constants(&[("command", "t"), ("language", "ka"), ("msg_type", "DMS")]),
            Self::CardRegisterWithDeduction => command("card_register_with_deduction")
                .required(&[
                    "amount",
                    "currency",
                    "client_ip_addr",
                    "description",
                    "biller_client_id",
                    "expiry",
                    "perspayee_expiry",
                    "perspayee_gen",
                ])
                .constants(&[("command", "z"), ("language", "ka"), ("msg_type", "SMS")]),
            Self::CardRegisterWithZeroAuth => command("card_register_with_zero_auth")
                .required(&[
                    "currency",
                    "client_ip_addr",
                    "description",
                    "biller_client_id",
                    "expiry",
                    "perspayee_expiry",
                    "perspayee_gen",
                ])
                .constants(&[("command", "p"), ("language", "ka"), ("msg_type", "AUTH")]),
            Self::RecurringPayment => command("recurring_payment")
                .required(&[
                    "amount",
                    "currency",
                    "client_ip_addr",
                    "description",
                    "biller_client_id",
                ])
                .constants(&[("command", "e"), ("language", "ka")]),
            Self::RefundToDebitCard => command("refund_to_debit_card")
                .required(&["trans_id", "amount"])
                .constants(&[("command", "g")]),
            Self::EndOfBusinessDay => {
                command("end_of_business_day").constants(&[("command", "b")])
            }
        }
    }
}

impl TbcOperation {
    /// Whether a successful call opens a new transaction on the gateway.
    fn creates_transaction(self) -> bool {
        matches!(
            self,
            Self::GetTransId
                | Self::PreAuthTrans
                | Self::CardRegisterWithDeduction
                | Self::CardRegisterWithZeroAuth
                | Self::RecurringPayment
        )
    }
}

/// Identifiers remembered between card gateway calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TbcSessionState {
    pub trans_id: Option<String>,
    pub refund_trans_id: Option<String>,
}

impl TbcSessionState {
    pub(crate) fn update(
        &mut self,
        operation: TbcOperation,
        kwargs: &Params,
        result: &ConnectorResult,
    ) {
        if operation.creates_transaction() {
            if let Some(trans_id) = result.get_string(TRANSACTION_ID) {
                self.trans_id = Some(trans_id);
            }
        }

        if operation == TbcOperation::RefundToDebitCard {
            if let Some(trans_id) = kwargs.get_text("trans_id") {
                self.trans_id = Some(trans_id);
            }
            if let Some(refund_trans_id) = result.get_string(REFUND_TRANS_ID) {
                self.refund_trans_id = Some(refund_trans_id);
            }
        }
    }
}
