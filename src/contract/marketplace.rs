//! Marketplace contract interface.
//!
//! One contract carries the collection, the USD price feed adapter, the sale
//! book and the lending book. USD amounts use 8 decimals, native amounts 18.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IMarketplace {
        // Collection
        function mint(string uri) external returns (uint256);
        function getTokensOfOwner(address owner) external view returns (uint256[]);
        function getAllTokens() external view returns (uint256[]);
        function totalMinted() external view returns (uint256);
        function tokenURI(uint256 tokenId) external view returns (string);
        function ownerOf(uint256 tokenId) external view returns (address);
        function balanceOf(address owner) external view returns (uint256);
        function name() external view returns (string);
        function symbol() external view returns (string);
        function getNftContractAddress() external view returns (address);
        function getLendingContractAddress() external view returns (address);
        function getPriceFeedAddress() external view returns (address);
        function getUserActivityPoints(address user) external view returns (uint256);

        // Price feed
        function getLatestPrice() external view returns (int256);
        function convertUSDToETH(uint256 usdAmount) external view returns (uint256);
        function convertETHToUSD(uint256 ethAmount) external view returns (uint256);

        // Sales
        function createSale(uint256 tokenId, uint256 priceUSD) external;
        function purchaseNFT(uint256 tokenId) external payable;
        function cancelSale(uint256 tokenId) external;
        function getSaleInfo(uint256 tokenId) external view returns (address seller, uint256 priceUSD, bool isActive);
        function getSaleETHPrice(uint256 tokenId) external view returns (uint256 ethPrice, uint256 priceUSD);
        function getTokensForSale() external view returns (uint256[]);
        function getAllActiveSales() external view returns (
            uint256[] tokenIds,
            address[] sellers,
            uint256[] pricesUSD,
            uint256[] pricesETH
        );

        // Loans
        function requestLoan(uint256 tokenId, uint256 loanAmountUSD, uint256 durationInDays) external;
        function fundLoan(uint256 tokenId) external payable;
        function repayLoan(uint256 tokenId) external payable;
        function liquidateAsset(uint256 tokenId) external;
        function cancelLoanRequest(uint256 tokenId) external;
        function checkAndPrepareLiquidations() external;
        function getLoanInfo(uint256 tokenId) external view returns (
            uint256 loanAmount,
            uint256 interestAmount,
            uint256 deadline,
            address borrower,
            address lender,
            uint256 startTime,
            bool isActive
        );
        function getLoanInfoWithUSD(uint256 tokenId) external view returns (
            uint256 loanAmountETH,
            uint256 interestAmountETH,
            uint256 loanAmountUSD,
            uint256 interestAmountUSD,
            uint256 deadline,
            address borrower,
            address lender,
            uint256 startTime,
            bool active
        );
        function getAllActiveLoans() external view returns (
            uint256[] tokenIds,
            address[] borrowers,
            uint256[] loanAmounts,
            uint256[] deadlines,
            bool[] isFunded
        );
        function getTokensForLoan() external view returns (uint256[]);
        function isLoanExpired(uint256 tokenId) external view returns (bool);
        function getLiquidatableTokens() external view returns (uint256[]);
        function getTotalRepaymentAmount(uint256 tokenId) external view returns (uint256);
        function getTotalRepaymentAmountWithUSD(uint256 tokenId) external view returns (uint256 ethAmount, uint256 usdAmount);

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        event SaleCreated(uint256 indexed tokenId, address indexed seller, uint256 priceUSD);
        event SaleCancelled(uint256 indexed tokenId, address indexed seller);
        event NFTPurchased(uint256 indexed tokenId, address indexed buyer, address indexed seller, uint256 priceETH);
        event LoanRequested(uint256 indexed tokenId, address indexed borrower, uint256 loanAmountUSD, uint256 durationInDays);
        event LoanFunded(uint256 indexed tokenId, address indexed lender, uint256 loanAmount, uint256 deadline);
        event LoanRepaid(uint256 indexed tokenId, address indexed borrower, uint256 repaymentAmount);
        event LoanLiquidated(uint256 indexed tokenId, address indexed lender);
        event LoanCancelled(uint256 indexed tokenId, address indexed borrower);
    }
}
