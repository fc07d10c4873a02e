mod account;
mod tx;

pub use account::{Account, AccountType, Bip44Path};
pub use tx::{
    BridgeTransferProps, IbcTransferProps, RevealPkProps, SubmitBondProps, SubmitUnbondProps,
    SubmitVoteProposalProps, SubmitWithdrawProps, TransferProps, TxPayload, TxProps, TxType,
    ValidationError, Vote,
};
