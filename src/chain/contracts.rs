use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IIdoSale {
        function buyWithExactB(uint256 amountB) external;
        function priceBPerA() external view returns (uint256);
        function availableTokenA() external view returns (uint256);
        function isOpen() external view returns (bool);
        function perWalletCapA() external view returns (uint256);
        function remainingForWallet(address wallet) external view returns (uint256);
    }
}
