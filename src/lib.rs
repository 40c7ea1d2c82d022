pub mod board;
pub mod clarity;
pub mod client;
pub mod error;
pub mod gateway;
pub mod node_client;
pub mod poll;
pub mod principal;
pub mod session;
pub mod test_helpers;
pub mod view;

pub use board::{
    BoardState,
    decode_board,
};
pub use clarity::ClarityValue;
pub use error::ClientError;
pub use gateway::{
    BroadcastReceipt,
    ChainReader,
    ContractCallRequest,
    ContractGateway,
    ContractIdentity,
    GameRecord,
    OpKind,
};
pub use node_client::NodeClient;
pub use poll::{
    GameSnapshot,
    PollingScheduler,
};
pub use principal::Principal;
pub use session::{
    NetworkId,
    SessionManager,
    WalletProvider,
    WalletSession,
};
pub use view::{
    GameStatus,
    GameView,
    Role,
    derive_view,
};
