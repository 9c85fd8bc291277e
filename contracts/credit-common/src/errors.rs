use soroban_sdk::{contracterror, panic_with_error, Env};

/// Error codes shared by every contract of the protocol so that a code means
/// the same thing whichever contract raised it.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CreditError {
    // lifecycle and configuration
    AlreadyInitialized = 1,
    NotInitialized = 2,
    IncorrectParameter = 3,
    IncorrectLiquidationThreshold = 4,
    TokenAlreadyAdded = 5,
    TooManyTokens = 6,
    TokenNotAllowed = 7,
    TokenIsNotQuoted = 8,

    // authorization
    CallerNotConfigurator = 10,
    CallerNotPausableAdmin = 11,
    CallerNotUnpausableAdmin = 12,
    CallerNotCreditManager = 13,
    CallerNotCreditFacade = 14,
    CallerNotQuotaKeeper = 15,
    CallerNotCreditAccountOwner = 16,
    NotApprovedBot = 17,
    NoPermission = 18,

    // limits
    BorrowAmountOutOfLimits = 20,
    BorrowedBlockLimit = 21,
    CreditManagerCantBorrow = 22,
    InsufficientLiquidity = 23,
    BorrowingMoreThanU2Forbidden = 24,
    QuotaLimitExceeded = 25,
    QuotaIsOutOfBounds = 26,
    TooManyEnabledTokens = 27,
    InsufficientBalance = 28,
    AmountTooSmall = 29,

    // solvency
    NotEnoughCollateral = 30,
    CustomHealthFactorTooLow = 31,

    // oracle
    PriceFeedDoesNotExist = 40,
    StalePrice = 41,
    IncorrectPrice = 42,

    // liquidation
    CreditAccountNotLiquidatable = 50,
    HealthFactorTooLowAfterLiquidation = 51,
    SeizedLessThanRequired = 52,

    // account state
    CreditAccountNotOpen = 60,
    CannotToggleQuotedToken = 61,
    UpdateQuotaOnZeroDebtAccount = 62,
    DebtToZeroWithActiveQuotas = 63,
    ForbiddenTokensEnabled = 64,
    ForbiddenToken = 65,

    // facade policy
    Paused = 70,
    CreditFacadeExpired = 71,
    NotAllowedWhenNotExpirable = 72,
    Reentrancy = 73,

    MathOverflow = 80,
}

/// Turns a fallible computation into a contract panic carrying a typed error.
pub trait OrPanic<T> {
    fn or_panic(self, env: &Env) -> T;
}

impl<T> OrPanic<T> for Result<T, CreditError> {
    fn or_panic(self, env: &Env) -> T {
        match self {
            Ok(value) => value,
            Err(err) => panic_with_error!(env, err),
        }
    }
}

impl<T> OrPanic<T> for Option<T> {
    fn or_panic(self, env: &Env) -> T {
        match self {
            Some(value) => value,
            None => panic_with_error!(env, CreditError::MathOverflow),
        }
    }
}
