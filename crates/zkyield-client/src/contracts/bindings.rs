use ethers::contract::abigen;

abigen!(
    ComplianceManager,
    r#"[
        function isCompliant(address user) external view returns (bool)
        function allowedJurisdiction() external view returns (uint256)
        function grantCompliance(uint256[2] a, uint256[2][2] b, uint256[2] c, uint256 commitment) external
    ]"#
);

abigen!(
    StrategyVault,
    r#"[
        function totalValueLocked() external view returns (uint256)
        function balanceOf(address user) external view returns (uint256)
        function shares(address user) external view returns (uint256)
        function totalShares() external view returns (uint256)
        function deposit(uint256[2] a, uint256[2][2] b, uint256[2] c, uint256 commitment) external payable
        function withdraw(uint256 sharesToBurn) external
    ]"#
);
